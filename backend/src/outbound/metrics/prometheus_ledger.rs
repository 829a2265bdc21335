//! Prometheus adapter for ledger write outcomes.

use prometheus::{IntCounterVec, Opts, Registry};

use crate::domain::ports::{LedgerMetrics, LedgerWriteOutcome};

/// Counts ledger writes by operation and outcome.
///
/// - **Name**: `waterlog_ledger_writes_total`
/// - **Type**: Counter
/// - **Labels**: `operation` (e.g. `add_intake`), `outcome`
///   (`committed`, `committed_after_retry`, `conflict_exhausted`,
///   `store_failed`)
pub struct PrometheusLedgerMetrics {
    writes_total: IntCounterVec,
}

impl PrometheusLedgerMetrics {
    /// Create the counter and register it with `registry`.
    ///
    /// # Errors
    ///
    /// Fails when a metric with the same name is already registered.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let writes_total = IntCounterVec::new(
            Opts::new(
                "waterlog_ledger_writes_total",
                "Ledger writes by operation and outcome",
            ),
            &["operation", "outcome"],
        )?;
        registry.register(Box::new(writes_total.clone()))?;
        Ok(Self { writes_total })
    }
}

impl LedgerMetrics for PrometheusLedgerMetrics {
    fn record_write(&self, operation: &'static str, outcome: LedgerWriteOutcome) {
        self.writes_total
            .with_label_values(&[operation, outcome.as_str()])
            .inc();
    }
}
