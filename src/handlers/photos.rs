// src/handlers/photos.rs
// DOCUMENTATION: HTTP handlers for photo upload and download
// PURPOSE: Buffer multipart uploads, stream stored bytes back as attachments

use crate::config::Config;
use crate::db::DocumentStore;
use crate::errors::RegistryError;
use crate::services::PhotoService;
use actix_multipart::{Multipart, MultipartError};
use actix_web::{http::header, web, HttpResponse, Responder};
use futures::TryStreamExt;

/// Multipart field carrying the file
const IMAGE_FIELD: &str = "image";

fn multipart_error(e: MultipartError) -> RegistryError {
    log::warn!("Rejected multipart upload: {}", e);
    RegistryError::ValidationError(format!("Invalid multipart payload: {}", e))
}

/// POST /photo
/// Store the `image` field, respond with the new identifier as plain text
pub async fn upload_photo(
    store: web::Data<dyn DocumentStore>,
    config: web::Data<Config>,
    mut payload: Multipart,
) -> Result<impl Responder, RegistryError> {
    let limit = config.max_upload_bytes;
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(mut field) = payload.try_next().await.map_err(multipart_error)? {
        if field.name() != IMAGE_FIELD {
            // Other fields are read and discarded
            while field.try_next().await.map_err(multipart_error)?.is_some() {}
            continue;
        }

        let title = field
            .content_disposition()
            .get_filename()
            .unwrap_or_default()
            .to_string();

        // Whole file is buffered in memory
        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(multipart_error)? {
            if bytes.len() + chunk.len() > limit {
                return Err(RegistryError::PayloadTooLarge(limit));
            }
            bytes.extend_from_slice(&chunk);
        }
        upload = Some((title, bytes));
    }

    let (title, bytes) = upload.ok_or_else(|| {
        RegistryError::ValidationError(format!("multipart field '{}' is required", IMAGE_FIELD))
    })?;

    let id = PhotoService::add_photo(store.get_ref(), &title, bytes).await?;
    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(id))
}

/// GET /photo/{id}
/// Raw bytes as an attachment named after the original file
pub async fn download_photo(
    store: web::Data<dyn DocumentStore>,
    path: web::Path<String>,
) -> Result<impl Responder, RegistryError> {
    let photo = PhotoService::get_photo(store.get_ref(), &path.into_inner()).await?;
    let disposition = photo.content_disposition();

    Ok(HttpResponse::Ok()
        .content_type("application/octet-stream")
        .insert_header((header::CONTENT_DISPOSITION, disposition))
        .body(photo.data.bytes))
}

/// Configuration for photo routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/photo")
            .route("", web::post().to(upload_photo))
            .route("/{id}", web::get().to(download_photo)),
    );
}
