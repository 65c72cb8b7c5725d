use std::path::Path;
use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::core::security::require_admin;
use crate::state::AppState;

/// Accept a document upload, persist it under the uploads directory,
/// then ingest it. On ingestion failure the response carries the error
/// message and the persisted file stays on disk for the operator to
/// inspect.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&headers, &state.tokens).await?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::BadRequest(err.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(sanitize_filename)
            .ok_or_else(|| ApiError::BadRequest("file field has no filename".to_string()))?;

        let data = field
            .bytes()
            .await
            .map_err(|err| ApiError::BadRequest(err.to_string()))?;
        if data.is_empty() {
            return Err(ApiError::BadRequest("uploaded file is empty".to_string()));
        }

        let dest = state.paths.upload_dir.join(&filename);
        tokio::fs::write(&dest, &data)
            .await
            .map_err(ApiError::internal)?;

        let chunks = state.ingestor.ingest(&dest.display().to_string()).await?;

        return Ok(Json(json!({
            "filename": filename,
            "chunks": chunks,
        })));
    }

    Err(ApiError::BadRequest(
        "multipart field 'file' is required".to_string(),
    ))
}

/// Keep only the final path component so an uploaded name cannot escape
/// the uploads directory.
fn sanitize_filename(name: &str) -> String {
    Path::new(name)
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
        .map(|name| name.to_string())
        .unwrap_or_else(|| "upload.bin".to_string())
}
