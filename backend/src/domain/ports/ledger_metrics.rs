//! Domain port for counting ledger write outcomes.
//!
//! Lets operators see how often optimistic writes collide without tying the
//! aggregator to a metrics backend.

/// Outcome of one ledger write attempt sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LedgerWriteOutcome {
    /// Stored on the first attempt.
    Committed,
    /// Stored after re-applying the intent once.
    CommittedAfterRetry,
    /// Lost the race twice and gave up.
    ConflictExhausted,
    /// The store rejected the write for a reason other than a conflict.
    StoreFailed,
}

impl LedgerWriteOutcome {
    /// Stable label value for exporters.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Committed => "committed",
            Self::CommittedAfterRetry => "committed_after_retry",
            Self::ConflictExhausted => "conflict_exhausted",
            Self::StoreFailed => "store_failed",
        }
    }
}

/// Metrics sink for ledger writes.
#[cfg_attr(test, mockall::automock)]
pub trait LedgerMetrics: Send + Sync {
    /// Count one write for `operation`.
    fn record_write(&self, operation: &'static str, outcome: LedgerWriteOutcome);
}

/// Discards every sample.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpLedgerMetrics;

impl LedgerMetrics for NoOpLedgerMetrics {
    fn record_write(&self, _operation: &'static str, _outcome: LedgerWriteOutcome) {}
}
