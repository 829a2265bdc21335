//! HTTP inbound adapter exposing the ledger and account endpoints.

pub mod accounts;
pub mod cache_control;
pub mod error;
pub mod health;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
pub(crate) mod validation;
pub mod water;

use actix_web::web;

use crate::domain::Error;

pub use error::ApiResult;

fn malformed_body(err: &actix_web::error::JsonPayloadError) -> actix_web::Error {
    Error::invalid_request(format!("malformed request body: {err}"))
        .with_details(serde_json::json!({ "code": "malformed_body" }))
        .into()
}

fn malformed_query(err: &actix_web::error::QueryPayloadError) -> actix_web::Error {
    Error::invalid_request(format!("malformed query string: {err}"))
        .with_details(serde_json::json!({ "code": "malformed_query" }))
        .into()
}

/// Mount every `/api/v1` handler and the extractor error handlers.
///
/// Body and query parse failures are reported in the same JSON error shape as
/// every other 400.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _| malformed_body(&err)))
        .app_data(web::QueryConfig::default().error_handler(|err, _| malformed_query(&err)))
        .configure(accounts::configure)
        .configure(water::configure);
}
