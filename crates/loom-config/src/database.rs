//! Lesson database configuration.

use serde::{Deserialize, Serialize};

fn default_path() -> String {
    String::from(".loom/lessons.db")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Path of the local libSQL database file. `:memory:` is accepted.
    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}
