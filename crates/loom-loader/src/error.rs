//! Loader error types. Both are terminal for the load that raised them.

use thiserror::Error;

/// The artifact could not be retrieved.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("artifact request to {address} failed with status {status}")]
    Status { address: String, status: u16 },

    #[error("artifact at {address} has non-executable content type {content_type:?}")]
    ContentType {
        address: String,
        content_type: String,
    },

    #[error("artifact request to {address} timed out")]
    Timeout { address: String },

    #[error("artifact request to {address} failed: {message}")]
    Transport { address: String, message: String },
}

/// The artifact was retrieved but could not produce a component.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The module imports something other than the base UI runtime.
    #[error("unsupported import of {specifier:?}: only the base UI runtime can be imported")]
    UnsupportedImport { specifier: String },

    /// Parsing, linking, or evaluating the module failed.
    #[error("module evaluation failed: {0}")]
    Evaluation(String),

    /// Neither the conventional export nor a default export is a component.
    #[error("no LessonComponent or default export found (exports: {})", display_list(.found))]
    MissingExport { found: Vec<String> },

    /// The component threw when invoked.
    #[error("component threw while rendering: {0}")]
    Invocation(String),

    /// The execution host itself failed.
    #[error("execution host error: {0}")]
    Host(String),
}

fn display_list(names: &[String]) -> String {
    if names.is_empty() {
        String::from("none")
    } else {
        names.join(", ")
    }
}

/// Either half of a load.
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Load(#[from] LoadError),
}
