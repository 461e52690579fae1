use anyhow::anyhow;
use axum::{extract::Multipart, Json};
use bytes::Bytes;
use serde::Serialize;

use crate::errors::AppError;
use crate::intake::pdf::extract_pdf_text;

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub text: String,
}

/// POST /api/v1/extract
///
/// Accepts a multipart upload with a `file` field containing a PDF and
/// returns its page-concatenated text.
pub async fn handle_extract(mut multipart: Multipart) -> Result<Json<ExtractResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let data: Bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
        if data.is_empty() {
            return Err(AppError::Validation("Uploaded file is empty".to_string()));
        }

        // pdf parsing is CPU-bound; keep it off the async executor
        let text = tokio::task::spawn_blocking(move || extract_pdf_text(&data))
            .await
            .map_err(|e| AppError::Internal(anyhow!("extraction task failed: {e}")))??;

        tracing::info!("Extracted {} characters from uploaded PDF", text.len());
        return Ok(Json(ExtractResponse { text }));
    }

    Err(AppError::Validation(
        "Multipart field 'file' is required".to_string(),
    ))
}
