use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, error};

use super::interface::{PdfTranslator, TranslateError, TranslateJob, TranslationOutput};

/// Client for a translation sidecar that wraps the engine behind HTTP.
/// The sidecar shares the storage directories with this server.
#[derive(Debug, Clone)]
pub struct SidecarTranslator {
    client: Client,
    base_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SidecarRequest {
    pub input_path: String,
    pub output_dir: String,
    pub lang_in: String,
    pub lang_out: String,
    pub service: String,
    pub thread: u32,
    pub envs: HashMap<String, String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SidecarResponse {
    pub success: bool,
    #[serde(default)]
    pub mono_path: Option<String>,
    #[serde(default)]
    pub dual_path: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl SidecarTranslator {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl From<&TranslateJob> for SidecarRequest {
    fn from(job: &TranslateJob) -> Self {
        Self {
            input_path: job.input.to_string_lossy().into_owned(),
            output_dir: job.output_dir.to_string_lossy().into_owned(),
            lang_in: job.lang_in.clone(),
            lang_out: job.lang_out.clone(),
            service: job.service().to_string(),
            thread: job.thread,
            envs: job
                .credentials
                .env_vars()
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        }
    }
}

#[async_trait]
impl PdfTranslator for SidecarTranslator {
    fn name(&self) -> &'static str {
        "sidecar"
    }

    async fn is_available(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!("Sidecar health check failed: {}", e);
                false
            }
        }
    }

    async fn translate(&self, job: &TranslateJob) -> Result<TranslationOutput, TranslateError> {
        let url = format!("{}/translate", self.base_url);
        debug!("Sending translation job for {} to {}", job.input.display(), url);

        let response = self
            .client
            .post(&url)
            .json(&SidecarRequest::from(job))
            .send()
            .await?;
        let result: SidecarResponse = response.json().await?;

        match result {
            SidecarResponse {
                success: true,
                mono_path: Some(mono),
                dual_path,
                ..
            } => Ok(TranslationOutput {
                mono_path: PathBuf::from(mono),
                dual_path: dual_path.map(PathBuf::from).unwrap_or_default(),
            }),
            SidecarResponse { error, .. } => {
                let error_msg = error.unwrap_or_else(|| "Unknown error".to_string());
                error!("Sidecar translation failed: {}", error_msg);
                Err(TranslateError::Engine(error_msg))
            }
        }
    }
}
