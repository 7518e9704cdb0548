//! Error types for gridview operations
//!
//! Cache lookups themselves never fail; these cover configuration and the
//! fetches the loader performs on the caller's behalf.

use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to parse config TOML: {0}")]
    Parse(String),
}

/// Errors reported by a [`RowFetcher`](crate::RowFetcher).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("Fetch from {table} failed: {reason}")]
    Failed { table: String, reason: String },
}

/// Master error type for all gridview errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),
}

/// Result type alias for gridview operations.
pub type GridResult<T> = Result<T, GridError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display_invalid_value() {
        let err = ConfigError::InvalidValue {
            field: "min_fetch_rows".to_string(),
            value: "0".to_string(),
            reason: "must be > 0".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("min_fetch_rows"));
        assert!(msg.contains("must be > 0"));
    }

    #[test]
    fn test_fetch_error_display_failed() {
        let err = FetchError::Failed {
            table: "orders".to_string(),
            reason: "connection reset".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("orders"));
        assert!(msg.contains("connection reset"));
    }

    #[test]
    fn test_grid_error_from_variants() {
        let config = GridError::from(ConfigError::Parse("bad".to_string()));
        assert!(matches!(config, GridError::Config(_)));

        let fetch = GridError::from(FetchError::Failed {
            table: "t".to_string(),
            reason: "timeout".to_string(),
        });
        assert!(matches!(fetch, GridError::Fetch(_)));
        assert!(fetch.to_string().contains("timeout"));
    }
}
