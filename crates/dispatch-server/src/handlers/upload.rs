use std::fmt;
use std::path::Path;

use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures_util::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::{Result, ServerError};
use crate::state::AppState;

const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub file_path: String,
    pub message: String,
}

/// `POST /upload_pdf`: stores the `file` part under a fresh name in the
/// upload directory.
pub async fn handler(state: web::Data<AppState>, mut payload: Multipart) -> Result<HttpResponse> {
    while let Some(field) = payload.next().await {
        let field = field.map_err(|e| ServerError::BadRequest(format!("Invalid upload: {}", e)))?;
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field
            .content_disposition()
            .and_then(|disposition| disposition.get_filename())
            .unwrap_or_default()
            .to_string();
        if filename.is_empty() {
            return Err(ServerError::BadRequest("No file selected".to_string()));
        }
        if !filename.to_lowercase().ends_with(".pdf") {
            return Err(ServerError::BadRequest("File must be a PDF".to_string()));
        }

        tokio::fs::create_dir_all(&state.upload_dir).await?;
        let path = state.upload_dir.join(format!("{}.pdf", Uuid::new_v4()));
        save_field(field, &path).await?;

        let file_path = path.display().to_string();
        log::info!("PDF uploaded: {} (from {})", file_path, filename);
        return Ok(HttpResponse::Ok().json(UploadResponse {
            file_path,
            message: "PDF uploaded successfully".to_string(),
        }));
    }

    Err(ServerError::BadRequest("No file part in the request".to_string()))
}

/// Writes the part to `path`; on any failure the partial file is removed.
async fn save_field<S, B, E>(chunks: S, path: &Path) -> Result<()>
where
    S: Stream<Item = std::result::Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: fmt::Display,
{
    let result = write_chunks(chunks, path).await;
    if result.is_err() {
        if let Err(e) = tokio::fs::remove_file(path).await {
            log::warn!("Could not remove partial upload {}: {}", path.display(), e);
        }
    }
    result
}

async fn write_chunks<S, B, E>(mut chunks: S, path: &Path) -> Result<()>
where
    S: Stream<Item = std::result::Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: fmt::Display,
{
    let mut file = tokio::fs::File::create(path).await?;
    while let Some(chunk) = chunks.next().await {
        let chunk = chunk.map_err(|e| ServerError::BadRequest(format!("Invalid upload: {}", e)))?;
        file.write_all(chunk.as_ref()).await?;
    }
    file.flush().await?;
    Ok(())
}
