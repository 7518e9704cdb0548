//! Cache configuration

use crate::{CellValue, ConfigError, GridResult};
use serde::{Deserialize, Serialize};

/// Default smallest batch the loader requests when extending a row window.
pub const DEFAULT_MIN_FETCH_ROWS: usize = 100;

/// Rule used to match an observed binding tuple against the requested ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingMatch {
    /// Type-matched comparison, tuples must have equal length
    #[default]
    Strict,
    /// Coercing comparison for untyped upstream data; missing positions read as null
    Loose,
}

impl BindingMatch {
    /// Element-wise comparison of two binding tuples under this rule.
    pub fn tuples_match(self, requested: &[CellValue], observed: &[CellValue]) -> bool {
        match self {
            Self::Strict => {
                requested.len() == observed.len()
                    && requested.iter().zip(observed).all(|(a, b)| a.strict_eq(b))
            }
            Self::Loose => {
                let len = requested.len().max(observed.len());
                (0..len).all(|i| {
                    match (requested.get(i), observed.get(i)) {
                        (Some(a), Some(b)) => a.loose_eq(b),
                        (Some(v), None) | (None, Some(v)) => v.is_null(),
                        (None, None) => true,
                    }
                })
            }
        }
    }
}

/// Configuration for a cache instance and its loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// Tuple matching rule for group size and group row registration.
    pub binding_match: BindingMatch,
    /// Smallest batch of rows the loader fetches when extending a row window.
    pub min_fetch_rows: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            binding_match: BindingMatch::Strict,
            min_fetch_rows: DEFAULT_MIN_FETCH_ROWS,
        }
    }
}

impl CacheConfig {
    /// Create a new cache config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the binding tuple matching rule.
    pub fn with_binding_match(mut self, binding_match: BindingMatch) -> Self {
        self.binding_match = binding_match;
        self
    }

    /// Set the minimum fetch batch.
    pub fn with_min_fetch_rows(mut self, rows: usize) -> Self {
        self.min_fetch_rows = rows;
        self
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(contents: &str) -> GridResult<Self> {
        let config: CacheConfig =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> GridResult<()> {
        if self.min_fetch_rows == 0 {
            return Err(ConfigError::InvalidValue {
                field: "min_fetch_rows".to_string(),
                value: self.min_fetch_rows.to_string(),
                reason: "min_fetch_rows must be greater than 0".to_string(),
            }
            .into());
        }
        Ok(())
    }
}
