//! Artifact and retry endpoint server configuration.

use serde::{Deserialize, Serialize};

fn default_bind() -> String {
    String::from("127.0.0.1:8787")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Address the `serve` command listens on.
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}
