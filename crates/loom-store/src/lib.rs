//! # loom-store
//!
//! Persists compiled lesson modules under a key derived from the lesson id
//! (`{prefix}{lesson_id}.js`) and hands back a publicly fetchable address.
//! Writes are upserts: putting the same id again replaces the artifact under
//! the same key. Revisions are not kept. The address handed back carries a
//! content version (`?v=...`), so a replaced artifact gets a new URL.
//!
//! The backing [`ObjectStore`] is selected from [`StorageConfig`]:
//! in-memory, a local directory, or an S3-compatible bucket.

mod error;

use std::sync::Arc;

use loom_config::{StorageBackend, StorageConfig};
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::{Attribute, Attributes, ObjectStore, PutOptions, PutPayload};

pub use error::StoreError;

/// Content type artifacts are uploaded and served with.
pub const CONTENT_TYPE: &str = "application/javascript";

/// A versioned address always names the same content, so clients may cache
/// indefinitely.
pub const CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// Hex characters of the content hash kept in a version.
const VERSION_LEN: usize = 16;

/// Content version of a compiled module: a truncated blake3 hash.
///
/// Used as the `?v=` query of artifact addresses and as the served `ETag`.
#[must_use]
pub fn content_version(compiled: &str) -> String {
    let mut hex = blake3::hash(compiled.as_bytes()).to_hex().to_string();
    hex.truncate(VERSION_LEN);
    hex
}

/// Compiled artifact storage.
#[derive(Clone)]
pub struct ArtifactStore {
    inner: Arc<dyn ObjectStore>,
    prefix: String,
    public_base_url: String,
    // `LocalFileSystem` rejects object attributes.
    with_attributes: bool,
}

impl std::fmt::Debug for ArtifactStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactStore")
            .field("store", &self.inner.to_string())
            .field("prefix", &self.prefix)
            .field("public_base_url", &self.public_base_url)
            .finish_non_exhaustive()
    }
}

impl ArtifactStore {
    /// Build the store selected by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotConfigured`] when the backend is missing
    /// required settings, or [`StoreError::Backend`] / [`StoreError::Io`] when
    /// the backend cannot be initialised.
    pub fn from_config(config: &StorageConfig) -> Result<Self, StoreError> {
        if !config.is_configured() {
            return Err(StoreError::NotConfigured(format!(
                "{:?} backend requires more settings",
                config.backend
            )));
        }

        let (inner, with_attributes): (Arc<dyn ObjectStore>, bool) = match config.backend {
            StorageBackend::Memory => (Arc::new(InMemory::new()), true),
            StorageBackend::Local => {
                std::fs::create_dir_all(&config.local_root)?;
                (Arc::new(LocalFileSystem::new_with_prefix(&config.local_root)?), false)
            }
            StorageBackend::S3 => {
                let region = if config.region.is_empty() {
                    "auto"
                } else {
                    config.region.as_str()
                };
                let mut builder = AmazonS3Builder::new()
                    .with_bucket_name(&config.bucket)
                    .with_region(region)
                    .with_access_key_id(&config.access_key_id)
                    .with_secret_access_key(&config.secret_access_key);
                if !config.endpoint.is_empty() {
                    builder = builder.with_endpoint(&config.endpoint);
                }
                (Arc::new(builder.build()?), true)
            }
        };

        tracing::debug!(backend = ?config.backend, prefix = %config.prefix, "artifact store ready");
        Ok(Self {
            inner,
            prefix: config.prefix.clone(),
            public_base_url: config.public_base_url.clone(),
            with_attributes,
        })
    }

    /// In-memory store, mainly for tests and previews.
    #[must_use]
    pub fn in_memory(public_base_url: &str) -> Self {
        Self {
            inner: Arc::new(InMemory::new()),
            prefix: String::new(),
            public_base_url: public_base_url.to_string(),
            with_attributes: true,
        }
    }

    /// Object key for a lesson's artifact.
    #[must_use]
    pub fn key(&self, lesson_id: &str) -> String {
        format!("{}{lesson_id}.js", self.prefix)
    }

    /// Public address of a lesson's artifact, without a version.
    #[must_use]
    pub fn address(&self, lesson_id: &str) -> String {
        format!(
            "{}/{}",
            self.public_base_url.trim_end_matches('/'),
            self.key(lesson_id)
        )
    }

    /// Address of `compiled` stored for `lesson_id`, pinned to its content.
    #[must_use]
    pub fn versioned_address(&self, lesson_id: &str, compiled: &str) -> String {
        format!("{}?v={}", self.address(lesson_id), content_version(compiled))
    }

    /// Upload (or overwrite) a lesson's compiled module and return its
    /// versioned address.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] on transport or permission failure.
    pub async fn put(&self, lesson_id: &str, compiled: &str) -> Result<String, StoreError> {
        let key = self.key(lesson_id);
        let mut options = PutOptions::default();
        if self.with_attributes {
            let mut attributes = Attributes::new();
            attributes.insert(Attribute::ContentType, CONTENT_TYPE.into());
            attributes.insert(Attribute::CacheControl, CACHE_CONTROL.into());
            options.attributes = attributes;
        }

        let payload = PutPayload::from(compiled.as_bytes().to_vec());
        self.inner
            .put_opts(&Path::from(key.as_str()), payload, options)
            .await?;

        let address = self.versioned_address(lesson_id, compiled);
        tracing::info!(lesson_id, %address, bytes = compiled.len(), "artifact stored");
        Ok(address)
    }

    /// Read a lesson's compiled module.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when nothing is stored for the lesson.
    pub async fn get(&self, lesson_id: &str) -> Result<String, StoreError> {
        let key = self.key(lesson_id);
        let result = match self.inner.get(&Path::from(key.as_str())).await {
            Ok(result) => result,
            Err(object_store::Error::NotFound { .. }) => return Err(StoreError::NotFound { key }),
            Err(e) => return Err(e.into()),
        };
        let bytes = result.bytes().await?;
        String::from_utf8(bytes.to_vec()).map_err(|_| StoreError::InvalidContent { key })
    }
}
