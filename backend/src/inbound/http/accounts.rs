//! Account HTTP handlers.
//!
//! ```text
//! POST /api/v1/auth/signup
//! POST /api/v1/auth/signin
//! POST /api/v1/auth/signout
//! ```
//!
//! Successful sign-up and sign-in both establish a session cookie carrying
//! the account id.

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{Account, Credentials, CredentialsValidationError, Error, Registration};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::private_no_store_header;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, PASSWORD, USERNAME, require};

/// Sign-up and sign-in body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CredentialsRequest {
    /// Login name, 3 to 32 characters after trimming.
    #[schema(example = "alice")]
    pub username: Option<String>,
    /// Password; must not be empty.
    #[schema(example = "correct horse battery staple")]
    pub password: Option<String>,
}

/// The authenticated account.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    /// Stable account identifier.
    pub account_id: String,
    /// Login name.
    pub username: String,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            account_id: account.id.to_string(),
            username: account.username.into(),
        }
    }
}

fn credentials_error(error: &CredentialsValidationError) -> Error {
    let field: FieldName = match error {
        CredentialsValidationError::EmptyPassword => PASSWORD,
        CredentialsValidationError::EmptyUsername
        | CredentialsValidationError::InvalidUsername(_) => USERNAME,
    };
    Error::invalid_request(error.to_string()).with_details(json!({
        "field": field.as_str(),
        "code": "invalid_credentials",
    }))
}

fn raw_parts(payload: CredentialsRequest) -> Result<(String, String), Error> {
    Ok((
        require(payload.username, USERNAME)?,
        require(payload.password, PASSWORD)?,
    ))
}

fn signed_in(session: &SessionContext, account: Account, created: bool) -> ApiResult<HttpResponse> {
    session.issue(&account.id)?;
    let mut builder = if created {
        HttpResponse::Created()
    } else {
        HttpResponse::Ok()
    };
    Ok(builder
        .insert_header(private_no_store_header())
        .json(AccountResponse::from(account)))
}

/// Create an account and sign it in.
#[utoipa::path(
    post,
    path = "/api/v1/auth/signup",
    request_body = CredentialsRequest,
    responses(
        (
            status = 201,
            description = "Account created; session cookie set",
            headers(("Set-Cookie" = String, description = "Session cookie")),
            body = AccountResponse
        ),
        (status = 400, description = "Invalid username or password", body = ErrorSchema),
        (status = 409, description = "Username taken", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "signUp",
    security([])
)]
#[post("/auth/signup")]
pub async fn sign_up(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CredentialsRequest>,
) -> ApiResult<HttpResponse> {
    let (username, password) = raw_parts(payload.into_inner())?;
    let registration = Registration::try_from_parts(&username, &password)
        .map_err(|err| credentials_error(&err))?;
    let account = state.accounts.sign_up(&registration).await?;
    signed_in(&session, account, true)
}

/// Verify credentials and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/signin",
    request_body = CredentialsRequest,
    responses(
        (
            status = 200,
            description = "Signed in; session cookie set",
            headers(("Set-Cookie" = String, description = "Session cookie")),
            body = AccountResponse
        ),
        (status = 400, description = "Missing username or password", body = ErrorSchema),
        (status = 401, description = "Invalid username or password", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "signIn",
    security([])
)]
#[post("/auth/signin")]
pub async fn sign_in(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CredentialsRequest>,
) -> ApiResult<HttpResponse> {
    let (username, password) = raw_parts(payload.into_inner())?;
    let credentials =
        Credentials::try_from_parts(&username, &password).map_err(|err| credentials_error(&err))?;
    let account = state.accounts.sign_in(&credentials).await?;
    signed_in(&session, account, false)
}

/// End the current session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/signout",
    responses((status = 204, description = "Session cleared")),
    tags = ["auth"],
    operation_id = "signOut",
    security([])
)]
#[post("/auth/signout")]
pub async fn sign_out(session: SessionContext) -> HttpResponse {
    session.revoke();
    HttpResponse::NoContent().finish()
}

/// Register the account handlers on a scope or app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(sign_up).service(sign_in).service(sign_out);
}
