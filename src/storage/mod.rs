//! Managed storage for staged inputs and translated outputs

pub mod stager;
pub mod streamer;

use std::path::{Path, PathBuf};

use crate::config::StorageConfig;

pub use stager::StageError;

#[derive(Debug, Clone)]
pub struct Storage {
    upload_dir: PathBuf,
    output_dir: PathBuf,
}

impl Storage {
    pub fn new(upload_dir: PathBuf, output_dir: PathBuf) -> Self {
        Self { upload_dir, output_dir }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config.upload_dir(), config.output_dir())
    }

    pub async fn ensure_dirs(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.upload_dir).await?;
        tokio::fs::create_dir_all(&self.output_dir).await
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path of a downloadable file, or `None` if the name could escape the
    /// output directory.
    pub fn resolve_output(&self, file_name: &str) -> Option<PathBuf> {
        if !is_plain_file_name(file_name) {
            return None;
        }
        Some(self.output_dir.join(file_name))
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

/// Absolute link under which `file_name` is served by the download endpoint.
pub fn download_url(public_base_url: &str, file_name: &str) -> String {
    format!(
        "{}/download/{}",
        public_base_url.trim_end_matches('/'),
        urlencoding::encode(file_name)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_plain_names_inside_output_dir() {
        let storage = Storage::new(PathBuf::from("/s/uploads"), PathBuf::from("/s/outputs"));
        assert_eq!(
            storage.resolve_output("abc-mono.pdf"),
            Some(PathBuf::from("/s/outputs/abc-mono.pdf"))
        );
    }

    #[test]
    fn rejects_names_that_leave_output_dir() {
        let storage = Storage::new(PathBuf::from("/s/uploads"), PathBuf::from("/s/outputs"));
        for name in ["", ".", "..", "../conf.yaml", "a/b.pdf", "..\\x.pdf", "/etc/passwd"] {
            assert_eq!(storage.resolve_output(name), None, "{name}");
        }
    }

    #[test]
    fn download_url_joins_base_and_name() {
        assert_eq!(
            download_url("https://pdf.example.com/", "abc-mono.pdf"),
            "https://pdf.example.com/download/abc-mono.pdf"
        );
        assert_eq!(
            download_url("http://localhost:8000", "my file.pdf"),
            "http://localhost:8000/download/my%20file.pdf"
        );
    }

    #[tokio::test]
    async fn ensure_dirs_creates_both_locations() {
        let root = tempfile::tempdir().unwrap();
        let storage = Storage::from_config(&StorageConfig {
            root: root.path().to_string_lossy().into_owned(),
        });
        storage.ensure_dirs().await.unwrap();
        assert!(storage.upload_dir().is_dir());
        assert!(storage.output_dir().is_dir());
    }
}
