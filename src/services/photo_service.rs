// src/services/photo_service.rs
// DOCUMENTATION: Business logic for photos
// PURPOSE: Persist uploads and hand back stored photos

use crate::db::{DocumentStore, PhotoRepository};
use crate::errors::RegistryError;
use crate::models::Photo;

pub struct PhotoService;

impl PhotoService {
    /// Store uploaded bytes under their original filename
    pub async fn add_photo(
        store: &dyn DocumentStore,
        title: &str,
        bytes: Vec<u8>,
    ) -> Result<String, RegistryError> {
        let size = bytes.len();
        let id = PhotoRepository::create_photo(store, &Photo::new(title, bytes)).await?;
        log::info!("Stored photo '{}' ({} bytes) with id: {}", title, size, id);
        Ok(id)
    }

    pub async fn get_photo(store: &dyn DocumentStore, id: &str) -> Result<Photo, RegistryError> {
        PhotoRepository::get_photo(store, id).await
    }
}
