//! Application state.

use std::sync::Arc;

use vsight_core::{AnalysisConfig, AnalysisOrchestrator};
use vsight_genai::GeminiClient;
use vsight_store::SqliteAnalysisStore;

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub orchestrator: AnalysisOrchestrator,
    pub store: SqliteAnalysisStore,
}

impl AppState {
    /// Create new application state from the environment.
    pub async fn new(config: ApiConfig) -> anyhow::Result<Self> {
        let processor = Arc::new(GeminiClient::from_env()?);
        let store = SqliteAnalysisStore::connect(&config.database_url).await?;
        let orchestrator = AnalysisOrchestrator::new(
            processor,
            Arc::new(store.clone()),
            AnalysisConfig::from_env(),
        );

        Ok(Self::from_parts(config, orchestrator, store))
    }

    pub fn from_parts(
        config: ApiConfig,
        orchestrator: AnalysisOrchestrator,
        store: SqliteAnalysisStore,
    ) -> Self {
        Self {
            config,
            orchestrator,
            store,
        }
    }
}
