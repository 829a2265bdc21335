//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only ever talk to driving
//! ports, so they can be tested against mocks.

use std::sync::Arc;

use crate::domain::ports::{AccountCommand, WaterHistoryQuery, WaterLedgerCommand};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Ledger mutations and today's record.
    pub ledger: Arc<dyn WaterLedgerCommand>,
    /// History projections.
    pub history: Arc<dyn WaterHistoryQuery>,
    /// Sign-up and sign-in.
    pub accounts: Arc<dyn AccountCommand>,
}

impl HttpState {
    /// Bundle the driving ports.
    pub fn new(
        ledger: Arc<dyn WaterLedgerCommand>,
        history: Arc<dyn WaterHistoryQuery>,
        accounts: Arc<dyn AccountCommand>,
    ) -> Self {
        Self {
            ledger,
            history,
            accounts,
        }
    }
}
