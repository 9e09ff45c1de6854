use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use loom_config::LoomConfig;
use loom_db::LessonDb;
use loom_model::HttpModel;
use loom_pipeline::{Orchestrator, RunSettings};
use loom_store::ArtifactStore;

/// Orchestrator wired to the production model, database and store.
pub type CliOrchestrator = Orchestrator<HttpModel, Arc<LessonDb>, ArtifactStore>;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub config: LoomConfig,
    pub db: Arc<LessonDb>,
    pub store: ArtifactStore,
}

impl AppContext {
    /// Open the lesson database and the artifact store named by `config`.
    pub async fn init(config: LoomConfig) -> anyhow::Result<Self> {
        let db_path = config.database.path.as_str();
        if db_path != ":memory:"
            && let Some(parent) = Path::new(db_path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let db = LessonDb::open_local(db_path)
            .await
            .context("failed to open lesson database")?;
        let store =
            ArtifactStore::from_config(&config.storage).context("failed to initialize artifact store")?;

        Ok(Self {
            config,
            db: Arc::new(db),
            store,
        })
    }

    /// Build an orchestrator. Requires the `model` section.
    pub fn orchestrator(&self) -> anyhow::Result<Arc<CliOrchestrator>> {
        let model_config = self.config.require_model()?;
        let model = HttpModel::from_config(model_config).context("failed to build model client")?;
        Ok(Arc::new(Orchestrator::new(
            model,
            Arc::clone(&self.db),
            self.store.clone(),
            RunSettings::from_config(&self.config),
        )))
    }
}
