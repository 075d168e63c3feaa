use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, error, info};

use super::interface::{PdfTranslator, TranslateError, TranslateJob, TranslationOutput};

/// Runs the PDF translation engine (pdf2zh by default) as a child process.
/// Provider credentials are set on the child only.
pub struct CliTranslator {
    program: String,
    args: Vec<String>,
}

impl CliTranslator {
    pub fn new(program: String, args: Vec<String>) -> Self {
        info!("Initialized CliTranslator: program={}, args={:?}", program, args);
        Self { program, args }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }

    /// Engine arguments for one job, after the configured leading args.
    fn job_args(job: &TranslateJob) -> Vec<String> {
        vec![
            job.input.to_string_lossy().into_owned(),
            "--lang-in".to_string(),
            job.lang_in.clone(),
            "--lang-out".to_string(),
            job.lang_out.clone(),
            "--service".to_string(),
            job.service().to_string(),
            "--thread".to_string(),
            job.thread.to_string(),
            "--output".to_string(),
            job.output_dir.to_string_lossy().into_owned(),
        ]
    }
}

/// Where the engine writes the outputs for `input`: `<stem>-mono.pdf` and `<stem>-dual.pdf`.
pub fn expected_outputs(input: &Path, output_dir: &Path) -> TranslationOutput {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    TranslationOutput {
        mono_path: output_dir.join(format!("{}-mono.pdf", stem)),
        dual_path: output_dir.join(format!("{}-dual.pdf", stem)),
    }
}

#[async_trait]
impl PdfTranslator for CliTranslator {
    fn name(&self) -> &'static str {
        "cli"
    }

    async fn is_available(&self) -> bool {
        let mut cmd = self.command();
        cmd.arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        cmd.status().await.map(|s| s.success()).unwrap_or(false)
    }

    async fn translate(&self, job: &TranslateJob) -> Result<TranslationOutput, TranslateError> {
        let mut cmd = self.command();
        cmd.args(Self::job_args(job))
            .envs(job.credentials.env_vars())
            .stdin(Stdio::null())
            .kill_on_drop(true);

        debug!(
            "Running {} for {} ({} -> {}, service={})",
            self.program,
            job.input.display(),
            job.lang_in,
            job.lang_out,
            job.service()
        );

        let output = cmd.output().await.map_err(TranslateError::Spawn)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            error!("Translation engine exited with {}: {}", output.status, stderr);
            let message = if stderr.is_empty() {
                format!("translation engine exited with {}", output.status)
            } else {
                stderr
            };
            return Err(TranslateError::Engine(message));
        }

        let outputs = expected_outputs(&job.input, &job.output_dir);
        if tokio::fs::metadata(&outputs.mono_path).await.is_err() {
            return Err(TranslateError::MissingOutput(outputs.mono_path));
        }
        debug!("Translation engine produced {}", outputs.mono_path.display());
        Ok(outputs)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::translate::interface::ProviderCredentials;
    use std::fs;
    use std::path::PathBuf;

    // Positional layout: $1 input ... ${11} output dir (see job_args).
    const FAKE_ENGINE: &str = r#"
input="$1"
out="${11}"
stem=$(basename "$input" .pdf)
printf '%s|%s|%s' "$7" "$DEEPL_AUTH_KEY" "$5" > "$out/$stem-mono.pdf"
cp "$input" "$out/$stem-dual.pdf"
"#;

    fn job(dir: &Path, credentials: ProviderCredentials) -> TranslateJob {
        let input = dir.join("abc.pdf");
        fs::write(&input, b"%PDF-1.4 source").unwrap();
        TranslateJob {
            input,
            output_dir: dir.to_path_buf(),
            lang_in: "auto".to_string(),
            lang_out: "ko".to_string(),
            credentials,
            thread: 4,
        }
    }

    fn script(dir: &Path, body: &str) -> CliTranslator {
        let path = dir.join("engine.sh");
        fs::write(&path, body).unwrap();
        CliTranslator::new("sh".to_string(), vec![path.to_string_lossy().into_owned()])
    }

    #[tokio::test]
    async fn passes_job_and_credentials_to_engine() {
        let dir = tempfile::tempdir().unwrap();
        let translator = script(dir.path(), FAKE_ENGINE);
        let job = job(dir.path(), ProviderCredentials::DeepL { auth_key: "K".to_string() });

        let out = translator.translate(&job).await.unwrap();
        assert_eq!(out.mono_path, dir.path().join("abc-mono.pdf"));
        assert_eq!(out.dual_path, dir.path().join("abc-dual.pdf"));
        assert_eq!(fs::read_to_string(&out.mono_path).unwrap(), "deepl|K|ko");
    }

    #[tokio::test]
    async fn failing_engine_reports_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let translator = script(dir.path(), "echo 'quota exceeded' >&2\nexit 3\n");
        let job = job(dir.path(), ProviderCredentials::Google { api_key: "g".to_string() });

        let err = translator.translate(&job).await.unwrap_err();
        assert!(matches!(err, TranslateError::Engine(ref m) if m == "quota exceeded"));
    }

    #[tokio::test]
    async fn missing_mono_output_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let translator = script(dir.path(), "exit 0\n");
        let job = job(dir.path(), ProviderCredentials::Google { api_key: "g".to_string() });

        let err = translator.translate(&job).await.unwrap_err();
        assert!(matches!(err, TranslateError::MissingOutput(_)));
    }

    #[tokio::test]
    async fn unknown_program_fails_to_spawn() {
        let dir = tempfile::tempdir().unwrap();
        let translator = CliTranslator::new("definitely-not-a-real-engine".to_string(), vec![]);
        let job = job(dir.path(), ProviderCredentials::Google { api_key: "g".to_string() });

        assert!(matches!(
            translator.translate(&job).await,
            Err(TranslateError::Spawn(_))
        ));
        assert!(!translator.is_available().await);
    }

    #[test]
    fn outputs_follow_input_stem() {
        let out = expected_outputs(Path::new("/up/1234.pdf"), Path::new("/out"));
        assert_eq!(out.mono_path, PathBuf::from("/out/1234-mono.pdf"));
        assert_eq!(out.dual_path, PathBuf::from("/out/1234-dual.pdf"));
    }
}
