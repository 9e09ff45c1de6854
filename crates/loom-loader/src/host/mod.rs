//! Execution hosts.
//!
//! A host owns a JavaScript realm that already carries the base UI runtime and
//! the capability implementations under the globals the wrapper reads. The
//! loader hands it a transient [`ModuleBlob`] and asks it for exports.

#[cfg(feature = "engine")]
mod boa;

#[cfg(feature = "engine")]
pub use boa::BoaHost;

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::LoadError;

static NEXT_BLOB: AtomicU64 = AtomicU64::new(1);

/// A synthesized wrapper module, alive only until its import settles.
#[derive(Debug)]
pub struct ModuleBlob {
    specifier: String,
    source: String,
}

impl ModuleBlob {
    #[must_use]
    pub fn new(source: String) -> Self {
        let n = NEXT_BLOB.fetch_add(1, Ordering::Relaxed);
        Self {
            specifier: format!("blob:loom/{n}"),
            source,
        }
    }

    /// Unique specifier the module is imported under.
    #[must_use]
    pub fn specifier(&self) -> &str {
        &self.specifier
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl Drop for ModuleBlob {
    fn drop(&mut self) {
        tracing::trace!(specifier = %self.specifier, "module blob released");
    }
}

/// A JavaScript realm that can import modules and call components.
pub trait ModuleHost {
    type Module;
    type Component;

    /// Parse, link, and evaluate `blob`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Evaluation`] if the module fails at any step.
    fn import(&mut self, blob: &ModuleBlob) -> Result<Self::Module, LoadError>;

    /// Names of exports whose value is defined.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Host`] if the namespace cannot be read.
    fn export_names(&mut self, module: &Self::Module) -> Result<Vec<String>, LoadError>;

    /// The export called `name`, if it is callable.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Host`] if the namespace cannot be read.
    fn component(
        &mut self,
        module: &Self::Module,
        name: &str,
    ) -> Result<Option<Self::Component>, LoadError>;

    /// Invoke `component` and return the element tree it renders.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Invocation`] if the component throws.
    fn render(&mut self, component: &Self::Component) -> Result<serde_json::Value, LoadError>;
}
