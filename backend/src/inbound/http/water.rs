//! Water ledger HTTP handlers.
//!
//! ```text
//! GET    /api/v1/water/today
//! POST   /api/v1/water/add
//! PUT    /api/v1/water/goal
//! PUT    /api/v1/water/update/{date}
//! PUT    /api/v1/water/update-by-id/{id}
//! DELETE /api/v1/water/remove/{id}
//! DELETE /api/v1/water/remove-amount
//! POST   /api/v1/water/reset
//! GET    /api/v1/water/history?days=7
//! GET    /api/v1/water/all
//! ```
//!
//! Every handler resolves the account from the session first, so requests
//! without a valid session fail with 401 before touching the ledger.

use actix_web::{HttpResponse, delete, get, post, put, web};

use crate::domain::DailyRecord;
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::private_no_store_header;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{AMOUNT, GOAL, parse_day_key, parse_entry_id, require};

#[path = "water_dto.rs"]
mod dto;

pub use dto::{
    AddIntakeRequest, AmountRequest, DailyRecordResponse, GoalRequest, HistoryParams,
    LedgerEntryResponse, ResetResponse,
};

fn record_response(record: &DailyRecord) -> HttpResponse {
    HttpResponse::Ok()
        .insert_header(private_no_store_header())
        .json(DailyRecordResponse::from(record))
}

fn history_response(records: &[DailyRecord]) -> HttpResponse {
    let body: Vec<DailyRecordResponse> = records.iter().map(DailyRecordResponse::from).collect();
    HttpResponse::Ok()
        .insert_header(private_no_store_header())
        .json(body)
}

/// Today's record, created empty on first access.
#[utoipa::path(
    get,
    path = "/api/v1/water/today",
    responses(
        (
            status = 200,
            description = "Today's daily record",
            headers(("Cache-Control" = String, description = "private, no-store")),
            body = DailyRecordResponse
        ),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["water"],
    operation_id = "getToday"
)]
#[get("/water/today")]
pub async fn today(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let account_id = session.require_account_id()?;
    let record = state.ledger.get_or_create_today(&account_id).await?;
    Ok(record_response(&record))
}

/// Log an intake against today's record.
#[utoipa::path(
    post,
    path = "/api/v1/water/add",
    request_body = AddIntakeRequest,
    responses(
        (status = 200, description = "Updated record", body = DailyRecordResponse),
        (status = 400, description = "Missing, negative or oversized amount", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Store unavailable or write conflict", body = ErrorSchema)
    ),
    tags = ["water"],
    operation_id = "addIntake"
)]
#[post("/water/add")]
pub async fn add_intake(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<AddIntakeRequest>,
) -> ApiResult<HttpResponse> {
    let account_id = session.require_account_id()?;
    let AddIntakeRequest { amount, note } = payload.into_inner();
    let amount = require(amount, AMOUNT)?;
    let record = state.ledger.add_intake(&account_id, amount, note).await?;
    Ok(record_response(&record))
}

/// Change today's goal.
#[utoipa::path(
    put,
    path = "/api/v1/water/goal",
    request_body = GoalRequest,
    responses(
        (status = 200, description = "Updated record", body = DailyRecordResponse),
        (status = 400, description = "Missing or non-positive goal", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Store unavailable or write conflict", body = ErrorSchema)
    ),
    tags = ["water"],
    operation_id = "setGoal"
)]
#[put("/water/goal")]
pub async fn set_goal(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<GoalRequest>,
) -> ApiResult<HttpResponse> {
    let account_id = session.require_account_id()?;
    let goal = require(payload.into_inner().goal, GOAL)?;
    let record = state.ledger.set_goal(&account_id, goal).await?;
    Ok(record_response(&record))
}

/// Overwrite the total of an existing day without touching its entries.
#[utoipa::path(
    put,
    path = "/api/v1/water/update/{date}",
    params(("date" = String, Path, description = "Calendar day, YYYY-MM-DD")),
    request_body = AmountRequest,
    responses(
        (status = 200, description = "Updated record", body = DailyRecordResponse),
        (status = 400, description = "Invalid date or amount", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "No record for that day", body = ErrorSchema),
        (status = 503, description = "Store unavailable or write conflict", body = ErrorSchema)
    ),
    tags = ["water"],
    operation_id = "setAmountForDate"
)]
#[put("/water/update/{date}")]
pub async fn set_amount_for_date(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<AmountRequest>,
) -> ApiResult<HttpResponse> {
    let account_id = session.require_account_id()?;
    let day_key = parse_day_key(&path.into_inner())?;
    let amount = require(payload.into_inner().amount, AMOUNT)?;
    let record = state
        .ledger
        .set_amount_for_date(&account_id, day_key, amount)
        .await?;
    Ok(record_response(&record))
}

/// Change one entry's amount and recompute the day's total.
#[utoipa::path(
    put,
    path = "/api/v1/water/update-by-id/{id}",
    params(("id" = String, Path, description = "Entry identifier")),
    request_body = AmountRequest,
    responses(
        (status = 200, description = "Updated record", body = DailyRecordResponse),
        (status = 400, description = "Invalid id or amount", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Entry not found", body = ErrorSchema),
        (status = 503, description = "Store unavailable or write conflict", body = ErrorSchema)
    ),
    tags = ["water"],
    operation_id = "setAmountById"
)]
#[put("/water/update-by-id/{id}")]
pub async fn set_amount_by_id(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<AmountRequest>,
) -> ApiResult<HttpResponse> {
    let account_id = session.require_account_id()?;
    let entry_id = parse_entry_id(&path.into_inner())?;
    let amount = require(payload.into_inner().amount, AMOUNT)?;
    let record = state
        .ledger
        .set_amount_by_id(&account_id, entry_id, amount)
        .await?;
    Ok(record_response(&record))
}

/// Delete one entry and subtract it from its day's total.
#[utoipa::path(
    delete,
    path = "/api/v1/water/remove/{id}",
    params(("id" = String, Path, description = "Entry identifier")),
    responses(
        (status = 200, description = "Updated record", body = DailyRecordResponse),
        (status = 400, description = "Invalid id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Entry not found", body = ErrorSchema),
        (status = 503, description = "Store unavailable or write conflict", body = ErrorSchema)
    ),
    tags = ["water"],
    operation_id = "removeEntryById"
)]
#[delete("/water/remove/{id}")]
pub async fn remove_entry(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let account_id = session.require_account_id()?;
    let entry_id = parse_entry_id(&path.into_inner())?;
    let record = state.ledger.remove_entry_by_id(&account_id, entry_id).await?;
    Ok(record_response(&record))
}

/// Log a removal against today's record as a negative entry.
#[utoipa::path(
    delete,
    path = "/api/v1/water/remove-amount",
    request_body = AmountRequest,
    responses(
        (status = 200, description = "Updated record", body = DailyRecordResponse),
        (status = 400, description = "Missing, negative or oversized amount", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Store unavailable or write conflict", body = ErrorSchema)
    ),
    tags = ["water"],
    operation_id = "removeAmount"
)]
#[delete("/water/remove-amount")]
pub async fn remove_amount(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<AmountRequest>,
) -> ApiResult<HttpResponse> {
    let account_id = session.require_account_id()?;
    let amount = require(payload.into_inner().amount, AMOUNT)?;
    let record = state.ledger.remove_amount(&account_id, amount).await?;
    Ok(record_response(&record))
}

/// Clear today's entries and total, keeping the goal.
#[utoipa::path(
    post,
    path = "/api/v1/water/reset",
    responses(
        (status = 200, description = "Reset summary", body = ResetResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Store unavailable or write conflict", body = ErrorSchema)
    ),
    tags = ["water"],
    operation_id = "resetToday"
)]
#[post("/water/reset")]
pub async fn reset_today(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let account_id = session.require_account_id()?;
    let outcome = state.ledger.reset_today(&account_id).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_store_header())
        .json(ResetResponse::from(outcome)))
}

/// Records from the trailing window, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/water/history",
    params(HistoryParams),
    responses(
        (status = 200, description = "Recent records", body = [DailyRecordResponse]),
        (status = 400, description = "Window out of range", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["water"],
    operation_id = "recentHistory"
)]
#[get("/water/history")]
pub async fn recent_history(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<HistoryParams>,
) -> ApiResult<HttpResponse> {
    let account_id = session.require_account_id()?;
    let records = state
        .history
        .recent_history(&account_id, query.into_inner().days)
        .await?;
    Ok(history_response(&records))
}

/// Every record the account has, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/water/all",
    responses(
        (status = 200, description = "All records", body = [DailyRecordResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["water"],
    operation_id = "allHistory"
)]
#[get("/water/all")]
pub async fn all_history(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let account_id = session.require_account_id()?;
    let records = state.history.all_history(&account_id).await?;
    Ok(history_response(&records))
}

/// Register the ledger handlers on a scope or app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(today)
        .service(add_intake)
        .service(set_goal)
        .service(set_amount_for_date)
        .service(set_amount_by_id)
        .service(remove_entry)
        .service(remove_amount)
        .service(reset_today)
        .service(recent_history)
        .service(all_history);
}

#[cfg(test)]
#[path = "water_tests.rs"]
mod tests;
