//! Prometheus-backed metrics adapters, compiled with the `metrics` feature.

mod prometheus_ledger;

pub use prometheus_ledger::PrometheusLedgerMetrics;
