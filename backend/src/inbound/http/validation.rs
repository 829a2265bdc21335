//! Request parsing helpers shared by the HTTP handlers.
//!
//! Every failure becomes an `invalid_request` error whose details name the
//! offending field so clients can highlight it.

use serde_json::json;
use uuid::Uuid;

use crate::domain::{DayKey, EntryId, Error};

/// Request field names as they appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub(crate) const fn as_str(self) -> &'static str {
        self.0
    }
}

pub(crate) const AMOUNT: FieldName = FieldName::new("amount");
pub(crate) const GOAL: FieldName = FieldName::new("goal");
pub(crate) const DATE: FieldName = FieldName::new("date");
pub(crate) const ENTRY_ID: FieldName = FieldName::new("id");
pub(crate) const USERNAME: FieldName = FieldName::new("username");
pub(crate) const PASSWORD: FieldName = FieldName::new("password");

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let name = field.as_str();
    Error::invalid_request(format!("missing required field: {name}")).with_details(json!({
        "field": name,
        "code": "missing_field",
    }))
}

/// Unwrap an optional body field or report it as missing.
pub(crate) fn require<T>(value: Option<T>, field: FieldName) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

pub(crate) fn parse_entry_id(value: &str) -> Result<EntryId, Error> {
    Uuid::parse_str(value)
        .map(EntryId::from_uuid)
        .map_err(|_| {
            Error::invalid_request("entry id must be a valid UUID").with_details(json!({
                "field": ENTRY_ID.as_str(),
                "value": value,
                "code": "invalid_uuid",
            }))
        })
}

pub(crate) fn parse_day_key(value: &str) -> Result<DayKey, Error> {
    value.parse::<DayKey>().map_err(|err| {
        Error::invalid_request(err.to_string()).with_details(json!({
            "field": DATE.as_str(),
            "value": value,
            "code": "invalid_date",
        }))
    })
}
