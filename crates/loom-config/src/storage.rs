//! Artifact storage configuration.

use serde::{Deserialize, Serialize};

/// Which object store backs the artifact store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// Process-local, lost on exit.
    Memory,
    /// A directory on the local filesystem.
    #[default]
    Local,
    /// An S3-compatible bucket (AWS, R2, MinIO).
    S3,
}

fn default_local_root() -> String {
    String::from(".loom/artifacts")
}

fn default_bucket() -> String {
    String::from("lessons")
}

fn default_public_base_url() -> String {
    String::from("http://127.0.0.1:8787/artifacts")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Root directory for the `local` backend.
    #[serde(default = "default_local_root")]
    pub local_root: String,

    /// Bucket name for the `s3` backend.
    #[serde(default = "default_bucket")]
    pub bucket: String,

    /// Custom endpoint (R2, MinIO). Empty means AWS.
    #[serde(default)]
    pub endpoint: String,

    #[serde(default)]
    pub region: String,

    #[serde(default)]
    pub access_key_id: String,

    #[serde(default)]
    pub secret_access_key: String,

    /// Key prefix inside the bucket, e.g. `lessons/`.
    #[serde(default)]
    pub prefix: String,

    /// Public base address artifacts are served from.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            local_root: default_local_root(),
            bucket: default_bucket(),
            endpoint: String::new(),
            region: String::new(),
            access_key_id: String::new(),
            secret_access_key: String::new(),
            prefix: String::new(),
            public_base_url: default_public_base_url(),
        }
    }
}

impl StorageConfig {
    /// Check if the selected backend has the fields it needs.
    pub fn is_configured(&self) -> bool {
        match self.backend {
            StorageBackend::Memory => !self.public_base_url.is_empty(),
            StorageBackend::Local => !self.local_root.is_empty() && !self.public_base_url.is_empty(),
            StorageBackend::S3 => {
                !self.bucket.is_empty()
                    && !self.access_key_id.is_empty()
                    && !self.secret_access_key.is_empty()
                    && !self.public_base_url.is_empty()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_local_and_configured() {
        let config = StorageConfig::default();
        assert_eq!(config.backend, StorageBackend::Local);
        assert!(config.is_configured());
        assert_eq!(config.public_base_url, "http://127.0.0.1:8787/artifacts");
    }

    #[test]
    fn s3_requires_credentials() {
        let mut config = StorageConfig {
            backend: StorageBackend::S3,
            ..Default::default()
        };
        assert!(!config.is_configured());
        config.access_key_id = "key".into();
        config.secret_access_key = "secret".into();
        assert!(config.is_configured());
    }
}
