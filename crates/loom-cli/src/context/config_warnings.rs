use loom_config::{LoomConfig, StorageBackend};

/// Log configuration that looks accidental.
pub fn warn_unconfigured(config: &LoomConfig) {
    for warning in collect_unconfigured_warnings(config, std::env::vars()) {
        tracing::warn!("{warning}");
    }
}

fn collect_unconfigured_warnings<I>(config: &LoomConfig, env: I) -> Vec<String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let env_keys = env.into_iter().map(|(key, _)| key).collect::<Vec<_>>();

    let mut warnings = Vec::new();

    if !config.model.is_configured() && has_env_prefix(&env_keys, "LOOM_MODEL") {
        warnings.push(
            "Model config appears default while LOOM_MODEL* env vars exist. Use double underscores (example: LOOM_MODEL__API_KEY)."
                .to_string(),
        );
    }

    if !config.storage.is_configured() && has_env_prefix(&env_keys, "LOOM_STORAGE") {
        warnings.push(
            "Storage config is incomplete while LOOM_STORAGE* env vars exist. Use double underscores (example: LOOM_STORAGE__BUCKET)."
                .to_string(),
        );
    }

    if config.storage.backend == StorageBackend::Memory {
        warnings.push(
            "Storage backend is 'memory': artifacts are lost when this process exits.".to_string(),
        );
    }

    warnings
}

fn has_env_prefix(keys: &[String], prefix: &str) -> bool {
    keys.iter().any(|key| key.starts_with(prefix))
}
