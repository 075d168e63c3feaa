use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::Result;
use regex::Regex;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub download: DownloadConfig,
    #[serde(default)]
    pub translator: TranslatorConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared secret every submission must carry in `auth_key`.
    #[serde(default)]
    pub auth_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root of the managed storage; staged inputs go to `uploads/`,
    /// translated files to `outputs/`.
    #[serde(default = "default_storage_root")]
    pub root: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Externally reachable base URL of this service, used to build download links.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatorConfig {
    /// "cli" runs the engine as a child process, "sidecar" talks to it over HTTP.
    #[serde(default = "default_backend")]
    pub backend: String,
    #[serde(default = "default_program")]
    pub program: String,
    /// Arguments placed before the input file, e.g. `["-m", "pdf2zh"]` with `python3`.
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default = "default_sidecar_url")]
    pub sidecar_url: String,
    #[serde(default = "default_lang_in")]
    pub lang_in: String,
    #[serde(default = "default_thread")]
    pub thread: u32,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_storage_root() -> String {
    "storage".to_string()
}

fn default_public_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_backend() -> String {
    "cli".to_string()
}

fn default_program() -> String {
    "pdf2zh".to_string()
}

fn default_sidecar_url() -> String {
    "http://localhost:8001".to_string()
}

fn default_lang_in() -> String {
    "auto".to_string()
}

fn default_thread() -> u32 {
    4
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
        }
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            public_base_url: default_public_base_url(),
        }
    }
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            program: default_program(),
            args: Vec::new(),
            sidecar_url: default_sidecar_url(),
            lang_in: default_lang_in(),
            thread: default_thread(),
            timeout_secs: None,
        }
    }
}

impl StorageConfig {
    pub fn upload_dir(&self) -> PathBuf {
        PathBuf::from(&self.root).join("uploads")
    }

    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(&self.root).join("outputs")
    }
}

impl Config {
    /// Load configuration from a YAML or JSON file, substituting `${VAR}` references.
    pub fn load(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            anyhow::bail!("Configuration file not found: {}", path);
        }
        let content = substitute_env(&fs::read_to_string(path)?);

        let path_lower = path.to_lowercase();
        let config = if path_lower.ends_with(".json") {
            serde_json::from_str(&content)?
        } else {
            serde_yaml::from_str(&content)?
        };
        Ok(config)
    }

    /// Apply `PDF_TRANSLATE_*` environment overrides on top of the loaded values.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("PDF_TRANSLATE_AUTH_KEY") {
            self.auth.auth_key = key;
        }
        if let Ok(url) = std::env::var("PDF_TRANSLATE_PUBLIC_URL") {
            self.download.public_base_url = url;
        }
        if let Some(port) = std::env::var("PDF_TRANSLATE_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
        {
            self.server.port = port;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.auth.auth_key.is_empty() || self.auth.auth_key.starts_with("${") {
            anyhow::bail!("auth.auth_key is not configured (set PDF_TRANSLATE_AUTH_KEY)");
        }
        if self.translator.thread == 0 {
            anyhow::bail!("translator.thread must be at least 1");
        }
        Ok(())
    }
}

/// Replace `${VAR_NAME}` with the variable's value; unknown variables are left as-is.
pub fn substitute_env(content: &str) -> String {
    let pattern = Regex::new(r"\$\{(\w+)\}").expect("valid env pattern");
    pattern
        .replace_all(content, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
}
