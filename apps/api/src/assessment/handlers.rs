use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use std::time::Instant;
use tracing::info;

use crate::assessment::models::{
    AnalysisResponse, BatchAnalysisResponse, BatchResultItem, CriteriaResponse, StatsResponse,
};
use crate::errors::AppError;
use crate::extract::{extract_text, DocumentFormat, ALLOWED_EXTENSIONS};
use crate::pipeline::analyze_text;
use crate::state::AppState;

/// One uploaded CV pulled out of a multipart body.
struct UploadedFile {
    filename: String,
    bytes: Bytes,
}

/// POST /api/v1/analyze
/// Accepts a single CV in a multipart field named `cv_file` or `file`.
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalysisResponse>, AppError> {
    let mut files = collect_uploads(multipart, &["cv_file", "file"]).await?;
    let file = files.pop().ok_or_else(|| {
        AppError::Validation("No file selected. Please select a valid file.".to_string())
    })?;

    let started = Instant::now();
    match run_analysis(&state, &file).await {
        Ok(assessment) => {
            state.metrics.record_success(started.elapsed());
            info!(
                "Analyzed '{}' in {}ms: {:?}",
                file.filename,
                started.elapsed().as_millis(),
                assessment.qualification_rating
            );
            Ok(Json(AnalysisResponse {
                status: "success".to_string(),
                assessment,
            }))
        }
        Err(e) => {
            state.metrics.record_failure();
            Err(e)
        }
    }
}

/// POST /api/v1/analyze/batch
/// Accepts multiple CVs; returns a per-file result and never fails the whole
/// request because one file was bad.
pub async fn handle_batch_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<BatchAnalysisResponse>, AppError> {
    let files = collect_uploads(multipart, &[]).await?;
    if files.is_empty() {
        return Err(AppError::Validation(
            "No files selected. Please select valid files.".to_string(),
        ));
    }

    let mut results = Vec::with_capacity(files.len());
    for file in files {
        let started = Instant::now();
        match run_analysis(&state, &file).await {
            Ok(assessment) => {
                state.metrics.record_success(started.elapsed());
                results.push(BatchResultItem {
                    filename: file.filename,
                    status: "success".to_string(),
                    assessment: Some(assessment),
                    message: None,
                });
            }
            Err(e) => {
                state.metrics.record_failure();
                tracing::warn!("Batch analysis failed for '{}': {e}", file.filename);
                results.push(BatchResultItem {
                    filename: file.filename,
                    status: "error".to_string(),
                    assessment: None,
                    message: Some(e.to_string()),
                });
            }
        }
    }

    Ok(Json(BatchAnalysisResponse {
        status: "success".to_string(),
        results,
    }))
}

/// GET /api/v1/criteria
pub async fn handle_get_criteria(
    State(state): State<AppState>,
) -> Result<Json<CriteriaResponse>, AppError> {
    Ok(Json(CriteriaResponse {
        status: "success".to_string(),
        criteria: state.criteria.iter().cloned().collect(),
    }))
}

/// GET /api/v1/stats
pub async fn handle_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        status: "success".to_string(),
        stats: state.metrics.snapshot(),
    })
}

/// Reads file fields out of a multipart body. With `accepted_names` empty,
/// any field carrying a filename is taken (batch mode); otherwise only the
/// named fields are.
async fn collect_uploads(
    mut multipart: Multipart,
    accepted_names: &[&str],
) -> Result<Vec<UploadedFile>, AppError> {
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        if filename.is_empty() {
            continue;
        }
        if !accepted_names.is_empty() {
            let name = field.name().unwrap_or_default();
            if !accepted_names.contains(&name) {
                continue;
            }
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;

        files.push(UploadedFile { filename, bytes });
    }

    Ok(files)
}

/// Validates one upload and runs the pipeline over its extracted text.
async fn run_analysis(
    state: &AppState,
    file: &UploadedFile,
) -> Result<crate::assessment::models::Assessment, AppError> {
    let format = DocumentFormat::from_filename(&file.filename).ok_or_else(|| {
        AppError::UnsupportedFormat(format!(
            "Invalid file format. Allowed formats: {}",
            ALLOWED_EXTENSIONS.join(", ")
        ))
    })?;

    if file.bytes.len() > state.config.max_upload_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "File too large. Maximum allowed size is {}MB.",
            state.config.max_upload_bytes / (1024 * 1024)
        )));
    }

    let text = extract_text(format, &file.bytes)?;
    info!(
        "Extracted {} characters from '{}'",
        text.len(),
        file.filename
    );

    analyze_text(
        &text,
        &state.criteria,
        state.embedder.clone(),
        state.classifier.as_ref(),
        state.config.retrieval_top_k,
    )
    .await
}
