use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::Response,
    Json,
};
use std::time::Duration;
use tracing::{info, warn};

use crate::auth::verify_auth_key;
use crate::error::{AppError, ErrorResponse, Result};
use crate::state::AppState;
use crate::storage::{self, stager::stage_pdf, streamer};
use crate::translate::{
    RequestRejection, TranslateError, TranslateJob, TranslationOutput, TranslationRequest,
    TranslationResponse,
};

/// Translate a remote PDF and return a link to the translated file
#[utoipa::path(
    post,
    path = "/translate-pdf/",
    request_body = TranslationRequest,
    responses(
        (status = 200, description = "Translation finished", body = TranslationResponse),
        (status = 400, description = "Unsupported translator service", body = ErrorResponse),
        (status = 403, description = "Invalid auth key", body = ErrorResponse),
        (status = 404, description = "Source PDF could not be downloaded", body = ErrorResponse),
        (status = 422, description = "OpenAI requested without a model", body = ErrorResponse),
        (status = 500, description = "Translation failed", body = ErrorResponse)
    ),
    tag = "translate"
)]
pub async fn translate_pdf(
    State(state): State<AppState>,
    Json(request): Json<TranslationRequest>,
) -> Result<Json<TranslationResponse>> {
    if !verify_auth_key(&request.auth_key, &state.config.auth.auth_key) {
        warn!("Rejected translation request with invalid auth key");
        return Err(AppError::Unauthorized);
    }

    let credentials = request.credentials().map_err(|rejection| match rejection {
        RequestRejection::MissingModel => AppError::Validation(
            "model field is required when using OpenAI service".to_string(),
        ),
        RequestRejection::UnsupportedService(name) => AppError::UnsupportedService(name),
    })?;

    let staged = stage_pdf(&state.http_client, &request.pdf_url, state.storage.upload_dir()).await?;
    info!(
        "Staged {} for {} translation to {}",
        request.pdf_url,
        credentials.service(),
        request.target_language
    );

    let job = TranslateJob {
        input: staged.path().to_path_buf(),
        output_dir: state.storage.output_dir().to_path_buf(),
        lang_in: state.config.translator.lang_in.clone(),
        lang_out: request.target_language.clone(),
        credentials,
        thread: state.config.translator.thread,
    };
    let result = run_translation(&state, &job).await;
    staged.remove().await;
    let output = result?;

    let mono_name = output
        .mono_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| AppError::Internal("translation output has no file name".to_string()))?;
    info!("Translation finished: {}", mono_name);

    Ok(Json(TranslationResponse {
        download_url: storage::download_url(&state.config.download.public_base_url, &mono_name),
    }))
}

async fn run_translation(
    state: &AppState,
    job: &TranslateJob,
) -> std::result::Result<TranslationOutput, TranslateError> {
    let translation = state.translator.translate(job);
    match state.config.translator.timeout_secs {
        Some(secs) => tokio::time::timeout(Duration::from_secs(secs), translation)
            .await
            .map_err(|_| TranslateError::Timeout(secs))?,
        None => translation.await,
    }
}

/// Stream a translated PDF as an attachment
#[utoipa::path(
    get,
    path = "/download/{file_name}",
    params(("file_name" = String, Path, description = "Name of the translated file")),
    responses(
        (status = 200, description = "PDF stream", content_type = "application/pdf", body = Vec<u8>),
        (status = 404, description = "File not found", body = ErrorResponse)
    ),
    tag = "translate"
)]
pub async fn download_file(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
) -> Result<Response> {
    let not_found = || AppError::NotFound("File not found".to_string());

    let path = state.storage.resolve_output(&file_name).ok_or_else(not_found)?;
    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(not_found()),
        Err(e) => return Err(e.into()),
    };
    let metadata = file.metadata().await?;
    if !metadata.is_file() {
        return Err(not_found());
    }

    // Names that cannot be carried in a header are not servable.
    let disposition = HeaderValue::from_bytes(format!("attachment; filename={}", file_name).as_bytes())
        .map_err(|_| not_found())?;

    info!("Streaming {} ({} bytes)", file_name, metadata.len());
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/pdf")
        .header(header::CONTENT_LENGTH, metadata.len())
        .header(header::CONTENT_DISPOSITION, disposition)
        .body(streamer::body(file))
        .map_err(|e| AppError::Internal(e.to_string()))
}
