//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every ledger, account and health endpoint together
//! with the schema mirrors from [`crate::inbound::http::schemas`]. Swagger UI
//! serves it in debug builds.

use crate::inbound::http::accounts::{AccountResponse, CredentialsRequest};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::water::{
    AddIntakeRequest, AmountRequest, DailyRecordResponse, GoalRequest, LedgerEntryResponse,
    ResetResponse,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/auth/signin or /api/v1/auth/signup.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Waterlog API",
        description = "Daily water intake ledger with session-authenticated accounts."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::water::today,
        crate::inbound::http::water::add_intake,
        crate::inbound::http::water::set_goal,
        crate::inbound::http::water::set_amount_for_date,
        crate::inbound::http::water::set_amount_by_id,
        crate::inbound::http::water::remove_entry,
        crate::inbound::http::water::remove_amount,
        crate::inbound::http::water::reset_today,
        crate::inbound::http::water::recent_history,
        crate::inbound::http::water::all_history,
        crate::inbound::http::accounts::sign_up,
        crate::inbound::http::accounts::sign_in,
        crate::inbound::http::accounts::sign_out,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        AddIntakeRequest,
        AmountRequest,
        GoalRequest,
        LedgerEntryResponse,
        DailyRecordResponse,
        ResetResponse,
        CredentialsRequest,
        AccountResponse,
    )),
    tags(
        (name = "water", description = "Daily intake ledger"),
        (name = "auth", description = "Accounts and sessions"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
