use futures_util::StreamExt;
use reqwest::Client;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Error, Debug)]
#[error("could not download PDF: {0}")]
pub struct StageError(String);

impl From<reqwest::Error> for StageError {
    fn from(e: reqwest::Error) -> Self {
        StageError(e.to_string())
    }
}

impl From<std::io::Error> for StageError {
    fn from(e: std::io::Error) -> Self {
        StageError(e.to_string())
    }
}

/// A fetched PDF on local disk. The file is removed when the guard is dropped.
#[derive(Debug)]
pub struct StagedPdf {
    path: PathBuf,
}

impl StagedPdf {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the staged file without blocking the runtime.
    pub async fn remove(self) {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => debug!("Removed staged input {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove staged input {}: {}", self.path.display(), e),
        }
    }
}

// Fallback for early returns and dropped requests; `remove` is the normal path.
// A single unlink is short enough to run on the worker thread.
impl Drop for StagedPdf {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed staged input {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove staged input {}: {}", self.path.display(), e),
        }
    }
}

/// Download `url` into `upload_dir` under a fresh `<uuid>.pdf` name, writing
/// the body chunk by chunk as it arrives.
pub async fn stage_pdf(client: &Client, url: &str, upload_dir: &Path) -> Result<StagedPdf, StageError> {
    let response = client.get(url).send().await?.error_for_status()?;

    // The guard exists before the first write so a failed transfer leaves nothing behind.
    let staged = StagedPdf {
        path: upload_dir.join(format!("{}.pdf", Uuid::new_v4())),
    };
    let mut file = tokio::fs::File::create(staged.path()).await?;
    let mut stream = response.bytes_stream();
    let mut written = 0usize;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        written += chunk.len();
    }
    file.flush().await?;

    debug!("Staged {} ({} bytes) as {}", url, written, staged.path().display());
    Ok(staged)
}
