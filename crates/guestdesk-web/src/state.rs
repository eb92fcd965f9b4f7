use std::sync::Arc;

use guestdesk_core::{Config, ExtractionPipeline, ProviderSet, Storage};

/// Application state shared across all requests
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ExtractionPipeline>,
    pub storage: Arc<Storage>,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let storage = Storage::open(&config.database_path).await?;
        let providers = ProviderSet::azure(&config)?;
        Ok(Self::with_parts(providers, storage, config)?)
    }

    pub fn with_parts(
        providers: ProviderSet,
        storage: Storage,
        config: Config,
    ) -> guestdesk_core::Result<Self> {
        Ok(Self {
            pipeline: Arc::new(ExtractionPipeline::new(providers, &config)?),
            storage: Arc::new(storage),
            config: Arc::new(config),
        })
    }
}
