use actix_web::{http::header, web, HttpResponse, Responder};
use tracing::instrument;

use crate::errors::AppError;
use crate::storage::disk::DiskBlobStore;
use crate::AppState;

/// Serves files written by the disk blob store. Not mounted for remote backends.
#[instrument(skip(state))]
pub async fn serve_upload(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let not_found = || AppError::NotFound("File not found".to_string());

    let root = state.uploads_dir.as_deref().ok_or_else(not_found)?;
    let file_path = DiskBlobStore::resolve(root, &path).ok_or_else(not_found)?;

    let bytes = match tokio::fs::read(&file_path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(not_found()),
        Err(e) => return Err(AppError::InternalError(format!("Failed to read upload: {}", e))),
    };

    let content_type = infer::get(&bytes)
        .map(|kind| kind.mime_type())
        .unwrap_or("application/octet-stream");

    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, content_type))
        .insert_header((header::CACHE_CONTROL, "public, max-age=86400"))
        .insert_header((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
        .body(bytes))
}
