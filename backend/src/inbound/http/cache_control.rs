//! Cache policy for per-account API responses.

/// Ledger payloads are private to one account and change on every write.
pub const PRIVATE_NO_STORE: &str = "private, no-store";

/// Header tuple applied to every ledger and account response.
pub const fn private_no_store_header() -> (&'static str, &'static str) {
    ("Cache-Control", PRIVATE_NO_STORE)
}
