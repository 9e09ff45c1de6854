//! Dynamic loader configuration.

use serde::{Deserialize, Serialize};

const fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoaderConfig {
    /// Artifact fetch timeout in seconds. A timeout is reported as a fetch failure.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}
