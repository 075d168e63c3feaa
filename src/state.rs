use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::storage::Storage;
use crate::translate::{PdfTranslator, TranslatorFactory};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub storage: Storage,
    pub translator: Arc<dyn PdfTranslator>,
    pub http_client: reqwest::Client,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let translator = TranslatorFactory::create_translator(&config.translator)?;
        Self::with_translator(config, translator).await
    }

    /// Build state around an explicit translator backend.
    pub async fn with_translator(
        config: Config,
        translator: Arc<dyn PdfTranslator>,
    ) -> anyhow::Result<Self> {
        let storage = Storage::from_config(&config.storage);
        storage.ensure_dirs().await?;

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.fetch.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            config: Arc::new(config),
            storage,
            translator,
            http_client: builder.build()?,
        })
    }
}
