//! Process configuration loaded via OrthoConfig.
//!
//! Values come from `WATERLOG_*` environment variables or the matching
//! command-line flags. Unset values fall back to the defaults exposed by the
//! accessor methods.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::{
    DEFAULT_HISTORY_WINDOW_DAYS, DayBoundary, DayBoundaryParseError, MAX_HISTORY_WINDOW_DAYS,
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_DB_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Errors raised when a configured value cannot be interpreted.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The bind address is not `host:port`.
    #[error("invalid bind address '{value}': {source}")]
    BindAddr {
        /// Rejected value.
        value: String,
        /// Parse failure.
        #[source]
        source: std::net::AddrParseError,
    },
    /// The day boundary is not `utc`, `local`, or an offset.
    #[error(transparent)]
    DayBoundary(#[from] DayBoundaryParseError),
    /// The history window is outside `1..=31`.
    #[error("history window must be between 1 and {max} days, got {value}")]
    HistoryWindow {
        /// Rejected value.
        value: u32,
        /// Largest accepted window.
        max: u32,
    },
}

/// Server settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "WATERLOG")]
pub struct AppSettings {
    /// Listen address, `host:port`.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. In-memory stores are used when absent.
    pub database_url: Option<String>,
    /// Day boundary policy: `utc`, `local`, or an offset such as `+02:00`.
    pub day_boundary: Option<String>,
    /// Pool size.
    pub db_max_connections: Option<u32>,
    /// Pool checkout timeout in seconds.
    pub db_connect_timeout_secs: Option<u64>,
    /// Default window for `GET /water/history`.
    pub history_window_days: Option<u32>,
}

impl AppSettings {
    /// Parsed listen address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|source| SettingsError::BindAddr {
            value: raw.to_owned(),
            source,
        })
    }

    /// Configured database URL, ignoring blank values.
    #[must_use]
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Parsed day boundary; local midnight when unset.
    pub fn day_boundary(&self) -> Result<DayBoundary, SettingsError> {
        match self.day_boundary.as_deref() {
            Some(raw) => Ok(raw.parse()?),
            None => Ok(DayBoundary::default()),
        }
    }

    /// Pool size.
    #[must_use]
    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
            .max(1)
    }

    /// Pool checkout timeout.
    #[must_use]
    pub fn db_connect_timeout(&self) -> Duration {
        Duration::from_secs(
            self.db_connect_timeout_secs
                .unwrap_or(DEFAULT_DB_CONNECT_TIMEOUT_SECS),
        )
    }

    /// Default history window in days.
    pub fn history_window_days(&self) -> Result<u32, SettingsError> {
        let days = self
            .history_window_days
            .unwrap_or(DEFAULT_HISTORY_WINDOW_DAYS);
        if (1..=MAX_HISTORY_WINDOW_DAYS).contains(&days) {
            Ok(days)
        } else {
            Err(SettingsError::HistoryWindow {
                value: days,
                max: MAX_HISTORY_WINDOW_DAYS,
            })
        }
    }
}
