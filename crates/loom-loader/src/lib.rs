//! # loom-loader
//!
//! Turns a compiled lesson artifact at a storage address into a live
//! component: fetch the module text, rewrite runtime imports, synthesize a
//! wrapper that binds the runtime and every registered capability, import it
//! through a transient blob, and pick the entry export.
//!
//! Execution is delegated to a [`ModuleHost`]. With the `engine` feature the
//! crate ships [`BoaHost`], a headless host used for previews and tests.

pub mod error;
pub mod fetch;
pub mod host;
pub mod rewrite;
pub mod wrapper;

pub use error::{FetchError, LoadError, LoaderError};
pub use fetch::ArtifactFetcher;
#[cfg(feature = "engine")]
pub use host::BoaHost;
pub use host::{ModuleBlob, ModuleHost};

use loom_config::LoaderConfig;
use loom_core::ENTRY_COMPONENT;

/// Export names tried in order when picking the entry.
pub const ENTRY_EXPORTS: [&str; 2] = [ENTRY_COMPONENT, "default"];

/// A component extracted from an imported artifact.
#[derive(Debug, Clone)]
pub struct LoadedComponent<C> {
    pub component: C,
    /// Export the component was found under.
    pub export: &'static str,
}

/// Fetches artifacts and instantiates them in a host.
#[derive(Debug, Clone)]
pub struct DynamicLoader {
    fetcher: ArtifactFetcher,
}

impl DynamicLoader {
    /// # Errors
    ///
    /// Returns [`FetchError`] if the HTTP client cannot be built.
    pub fn new(config: &LoaderConfig) -> Result<Self, FetchError> {
        Ok(Self::with_fetcher(ArtifactFetcher::new(config)?))
    }

    #[must_use]
    pub const fn with_fetcher(fetcher: ArtifactFetcher) -> Self {
        Self { fetcher }
    }

    /// Fetch the artifact at `address` and instantiate it in `host`.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::Fetch`] if retrieval fails and
    /// [`LoaderError::Load`] if the module cannot produce a component.
    pub async fn load<H: ModuleHost>(
        &self,
        host: &mut H,
        address: &str,
    ) -> Result<LoadedComponent<H::Component>, LoaderError> {
        let text = self.fetcher.fetch(address).await?;
        let loaded = instantiate(host, &text)?;
        tracing::info!(address, export = loaded.export, "lesson component loaded");
        Ok(loaded)
    }
}

/// Rewrite `artifact` and wrap it into an importable module.
///
/// # Errors
///
/// Returns [`LoadError::UnsupportedImport`] for foreign imports.
pub fn prepare(artifact: &str) -> Result<String, LoadError> {
    let rewritten = rewrite::rewrite(artifact)?;
    Ok(wrapper::synthesize(&rewritten))
}

/// Import `artifact` in `host` and extract its entry component.
///
/// # Errors
///
/// Returns [`LoadError::MissingExport`] listing the defined exports when
/// neither entry export is callable, or whatever the host reports on import.
pub fn instantiate<H: ModuleHost>(
    host: &mut H,
    artifact: &str,
) -> Result<LoadedComponent<H::Component>, LoadError> {
    let blob = ModuleBlob::new(prepare(artifact)?);
    let imported = host.import(&blob);
    drop(blob);
    let module = imported?;

    for export in ENTRY_EXPORTS {
        if let Some(component) = host.component(&module, export)? {
            return Ok(LoadedComponent { component, export });
        }
    }
    let found = host.export_names(&module)?;
    tracing::warn!(?found, "artifact has no entry export");
    Err(LoadError::MissingExport { found })
}
