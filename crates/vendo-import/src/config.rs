//! Import service configuration.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use crate::error::{ImportError, ImportResult};

/// Environment variable for the lease poll interval in milliseconds.
pub const ENV_LEASE_POLL_MS: &str = "VENDO_IMPORT_LEASE_POLL_MS";
/// Environment variable for the batch size cap.
pub const ENV_MAX_ROWS: &str = "VENDO_IMPORT_MAX_ROWS";

fn default_lease_poll_interval_ms() -> u64 {
    1000
}

fn default_max_rows() -> usize {
    10_000
}

/// Configuration for [`crate::services::ImportService`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportConfig {
    /// How long a run waits between attempts to take a busy company lease.
    #[serde(default = "default_lease_poll_interval_ms")]
    pub lease_poll_interval_ms: u64,
    /// Largest batch accepted for reconciliation.
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            lease_poll_interval_ms: default_lease_poll_interval_ms(),
            max_rows: default_max_rows(),
        }
    }
}

impl ImportConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional:
    /// - `VENDO_IMPORT_LEASE_POLL_MS`: lease poll interval (default: 1000)
    /// - `VENDO_IMPORT_MAX_ROWS`: batch size cap (default: 10000)
    pub fn from_env() -> ImportResult<Self> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ImportResult<Self> {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_LEASE_POLL_MS) {
            config.lease_poll_interval_ms = parse_var(ENV_LEASE_POLL_MS, &value)?;
        }
        if let Some(value) = lookup(ENV_MAX_ROWS) {
            config.max_rows = parse_var(ENV_MAX_ROWS, &value)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Set the lease poll interval.
    #[must_use]
    pub fn with_lease_poll_interval(mut self, interval: Duration) -> Self {
        self.lease_poll_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the batch size cap.
    #[must_use]
    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }

    /// Lease poll interval as a duration.
    #[must_use]
    pub fn lease_poll_interval(&self) -> Duration {
        Duration::from_millis(self.lease_poll_interval_ms)
    }

    /// Reject values the service cannot run with.
    pub fn validate(&self) -> ImportResult<()> {
        if self.lease_poll_interval_ms == 0 {
            return Err(ImportError::configuration(format!(
                "{ENV_LEASE_POLL_MS} must be greater than zero"
            )));
        }
        if self.max_rows == 0 {
            return Err(ImportError::configuration(format!(
                "{ENV_MAX_ROWS} must be greater than zero"
            )));
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(var: &str, value: &str) -> ImportResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ImportError::configuration(format!("{var}: invalid value '{value}'")))
}
