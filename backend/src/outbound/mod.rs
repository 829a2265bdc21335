//! Outbound adapters implementing the domain's driven ports.
//!
//! - **persistence**: PostgreSQL adapters using Diesel.
//! - **memory**: process-local adapters for development and tests.
//! - **metrics**: Prometheus exporters (feature-gated).
//!
//! Adapters translate between domain types and infrastructure
//! representations and hold no ledger rules.

pub mod memory;
#[cfg(feature = "metrics")]
pub mod metrics;
pub(crate) mod password;
pub mod persistence;
