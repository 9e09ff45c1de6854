use loom_config::LoomConfig;

/// Load `.env` from the working directory (if any), then the layered config.
pub fn load_config() -> anyhow::Result<LoomConfig> {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        Err(error) if error.not_found() => {}
        Err(error) => tracing::warn!(%error, "failed to read .env; continuing without it"),
    }
    LoomConfig::load().map_err(anyhow::Error::from)
}
