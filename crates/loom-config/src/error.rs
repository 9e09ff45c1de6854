//! Configuration errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A TOML file or `LOOM_*` variable could not be parsed into the schema.
    #[error("failed to load loom configuration: {0}")]
    Figment(#[from] figment::Error),

    /// A section a command depends on lacks its required fields.
    #[error("[{section}] is not configured; set it in .loom/config.toml or via LOOM_{}__* variables", section.to_uppercase())]
    NotConfigured { section: String },

    /// A value is outside its accepted range.
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_configured_names_env_prefix() {
        let err = ConfigError::NotConfigured {
            section: "model".into(),
        };
        assert_eq!(
            err.to_string(),
            "[model] is not configured; set it in .loom/config.toml or via LOOM_MODEL__* variables"
        );
    }
}
