use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;
use utoipa::ToSchema;

/// Body of `POST /translate-pdf/`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TranslationRequest {
    /// Location of the source PDF
    #[schema(example = "https://example.com/paper.pdf")]
    pub pdf_url: String,
    /// One of `deepl`, `openai`, `google`
    #[schema(example = "deepl")]
    pub translator_service: String,
    /// Credential for the chosen provider
    pub api_key: String,
    pub auth_key: String,
    #[schema(example = "ko")]
    pub target_language: String,
    /// Required when `translator_service` is `openai`
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TranslationResponse {
    pub download_url: String,
}

/// Why a request was refused before any I/O took place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestRejection {
    MissingModel,
    UnsupportedService(String),
}

impl TranslationRequest {
    /// Resolve the provider and its credentials, enforcing that OpenAI
    /// requests name a model.
    pub fn credentials(&self) -> Result<ProviderCredentials, RequestRejection> {
        let service: TranslatorService = self
            .translator_service
            .parse()
            .map_err(|_| RequestRejection::UnsupportedService(self.translator_service.clone()))?;

        let api_key = self.api_key.clone();
        match service {
            TranslatorService::DeepL => Ok(ProviderCredentials::DeepL { auth_key: api_key }),
            TranslatorService::Google => Ok(ProviderCredentials::Google { api_key }),
            TranslatorService::OpenAi => match self.model.as_deref().map(str::trim) {
                Some(model) if !model.is_empty() => Ok(ProviderCredentials::OpenAi {
                    api_key,
                    model: model.to_string(),
                }),
                _ => Err(RequestRejection::MissingModel),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslatorService {
    #[serde(rename = "deepl")]
    DeepL,
    #[serde(rename = "openai")]
    OpenAi,
    Google,
}

impl TranslatorService {
    pub fn as_str(&self) -> &'static str {
        match self {
            TranslatorService::DeepL => "deepl",
            TranslatorService::OpenAi => "openai",
            TranslatorService::Google => "google",
        }
    }
}

impl fmt::Display for TranslatorService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TranslatorService {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deepl" => Ok(TranslatorService::DeepL),
            "openai" => Ok(TranslatorService::OpenAi),
            "google" => Ok(TranslatorService::Google),
            other => Err(other.to_string()),
        }
    }
}

/// Provider credentials for a single job. They are handed to the engine
/// invocation that runs the job and never written to the server's own environment.
#[derive(Clone, PartialEq, Eq)]
pub enum ProviderCredentials {
    DeepL { auth_key: String },
    OpenAi { api_key: String, model: String },
    Google { api_key: String },
}

impl ProviderCredentials {
    pub fn service(&self) -> TranslatorService {
        match self {
            ProviderCredentials::DeepL { .. } => TranslatorService::DeepL,
            ProviderCredentials::OpenAi { .. } => TranslatorService::OpenAi,
            ProviderCredentials::Google { .. } => TranslatorService::Google,
        }
    }

    /// Environment variables the engine reads for this provider.
    pub fn env_vars(&self) -> Vec<(&'static str, String)> {
        match self {
            ProviderCredentials::DeepL { auth_key } => vec![("DEEPL_AUTH_KEY", auth_key.clone())],
            ProviderCredentials::OpenAi { api_key, model } => vec![
                ("OPENAI_API_KEY", api_key.clone()),
                ("OPENAI_MODEL", model.clone()),
            ],
            ProviderCredentials::Google { api_key } => vec![("GOOGLE_API_KEY", api_key.clone())],
        }
    }
}

// Keys stay out of logs.
impl fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderCredentials::OpenAi { model, .. } => f
                .debug_struct("OpenAi")
                .field("model", model)
                .finish_non_exhaustive(),
            other => f.debug_struct(other.service().as_str()).finish_non_exhaustive(),
        }
    }
}

/// One translation run handed to the engine.
#[derive(Debug, Clone)]
pub struct TranslateJob {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub lang_in: String,
    pub lang_out: String,
    pub credentials: ProviderCredentials,
    pub thread: u32,
}

impl TranslateJob {
    pub fn service(&self) -> TranslatorService {
        self.credentials.service()
    }
}

/// Files produced by the engine for one input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationOutput {
    pub mono_path: PathBuf,
    pub dual_path: PathBuf,
}

#[derive(Error, Debug)]
pub enum TranslateError {
    #[error("failed to start translation engine: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("{0}")]
    Engine(String),

    #[error("translation engine did not produce {0}")]
    MissingOutput(PathBuf),

    #[error("translation service request failed: {0}")]
    Sidecar(#[from] reqwest::Error),

    #[error("translation timed out after {0}s")]
    Timeout(u64),
}

/// PDF translation engine
#[async_trait]
pub trait PdfTranslator: Send + Sync {
    fn name(&self) -> &'static str;

    /// Check whether the engine can be reached
    async fn is_available(&self) -> bool;

    /// Translate one staged PDF, returning the mono and dual output paths
    async fn translate(&self, job: &TranslateJob) -> Result<TranslationOutput, TranslateError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(service: &str, model: Option<&str>) -> TranslationRequest {
        TranslationRequest {
            pdf_url: "https://x/a.pdf".to_string(),
            translator_service: service.to_string(),
            api_key: "K".to_string(),
            auth_key: "secret".to_string(),
            target_language: "ko".to_string(),
            model: model.map(str::to_string),
        }
    }

    #[test]
    fn openai_requires_model() {
        assert_eq!(
            request("openai", None).credentials(),
            Err(RequestRejection::MissingModel)
        );
        assert_eq!(
            request("openai", Some("  ")).credentials(),
            Err(RequestRejection::MissingModel)
        );
        assert_eq!(
            request("openai", Some("gpt-4o-mini")).credentials(),
            Ok(ProviderCredentials::OpenAi {
                api_key: "K".to_string(),
                model: "gpt-4o-mini".to_string()
            })
        );
    }

    #[test]
    fn model_is_optional_for_other_services() {
        assert_eq!(
            request("deepl", None).credentials(),
            Ok(ProviderCredentials::DeepL { auth_key: "K".to_string() })
        );
        assert_eq!(
            request("google", None).credentials(),
            Ok(ProviderCredentials::Google { api_key: "K".to_string() })
        );
    }

    #[test]
    fn unknown_service_is_rejected() {
        assert_eq!(
            request("bing", Some("m")).credentials(),
            Err(RequestRejection::UnsupportedService("bing".to_string()))
        );
        assert_eq!(
            request("DeepL", None).credentials(),
            Err(RequestRejection::UnsupportedService("DeepL".to_string()))
        );
    }

    #[test]
    fn env_vars_per_provider() {
        let deepl = ProviderCredentials::DeepL { auth_key: "d".to_string() };
        assert_eq!(deepl.env_vars(), vec![("DEEPL_AUTH_KEY", "d".to_string())]);

        let openai = ProviderCredentials::OpenAi {
            api_key: "o".to_string(),
            model: "gpt-4o".to_string(),
        };
        assert_eq!(
            openai.env_vars(),
            vec![
                ("OPENAI_API_KEY", "o".to_string()),
                ("OPENAI_MODEL", "gpt-4o".to_string())
            ]
        );

        let google = ProviderCredentials::Google { api_key: "g".to_string() };
        assert_eq!(google.env_vars(), vec![("GOOGLE_API_KEY", "g".to_string())]);
    }

    #[test]
    fn debug_output_hides_keys() {
        let creds = ProviderCredentials::OpenAi {
            api_key: "sk-very-secret".to_string(),
            model: "gpt-4o".to_string(),
        };
        let printed = format!("{:?}", creds);
        assert!(printed.contains("gpt-4o"));
        assert!(!printed.contains("sk-very-secret"));
    }

    #[test]
    fn request_model_defaults_to_none() {
        let req: TranslationRequest = serde_json::from_str(
            r#"{"pdf_url":"u","translator_service":"deepl","api_key":"k","auth_key":"a","target_language":"ko"}"#,
        )
        .unwrap();
        assert!(req.model.is_none());
    }
}
