//! General pipeline configuration.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Smallest accepted attempt budget.
pub const MIN_ATTEMPTS: u32 = 1;

/// Largest accepted attempt budget.
pub const MAX_ATTEMPTS: u32 = 3;

const fn default_max_attempts() -> u32 {
    2
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Maximum generation attempts per run (first attempt plus self-corrections).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
        }
    }
}

impl GeneralConfig {
    /// Reject attempt budgets outside `1..=3`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if (MIN_ATTEMPTS..=MAX_ATTEMPTS).contains(&self.max_attempts) {
            Ok(())
        } else {
            Err(ConfigError::InvalidValue {
                field: "general.max_attempts".into(),
                reason: format!(
                    "must be between {MIN_ATTEMPTS} and {MAX_ATTEMPTS}, got {}",
                    self.max_attempts
                ),
            })
        }
    }
}
