use std::sync::Arc;
use anyhow::Result;
use tracing::info;

use crate::config::TranslatorConfig;
use super::cli::CliTranslator;
use super::client::SidecarTranslator;
use super::interface::PdfTranslator;

/// Factory for creating the PDF translation backend
pub struct TranslatorFactory;

impl TranslatorFactory {
    /// Create a translator based on the `translator.backend` setting.
    pub fn create_translator(config: &TranslatorConfig) -> Result<Arc<dyn PdfTranslator>> {
        info!("Initializing translator backend: {}", config.backend);

        match config.backend.as_str() {
            "cli" => Ok(Arc::new(CliTranslator::new(
                config.program.clone(),
                config.args.clone(),
            ))),
            "sidecar" => Ok(Arc::new(SidecarTranslator::new(config.sidecar_url.clone()))),
            other => Err(anyhow::anyhow!("Unsupported translator backend: {}", other)),
        }
    }
}
