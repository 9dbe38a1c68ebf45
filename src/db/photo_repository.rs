// src/db/photo_repository.rs
// DOCUMENTATION: Photo database operations
// PURPOSE: Store and fetch uploaded photos

use crate::db::document::{id_to_string, parse_object_id};
use crate::db::filter::Filter;
use crate::db::store::DocumentStore;
use crate::errors::RegistryError;
use crate::models::{Photo, PHOTO_COLLECTION};
use mongodb::bson;

pub struct PhotoRepository;

impl PhotoRepository {
    /// Create a new photo
    /// DOCUMENTATION: Bytes are stored inline as a BSON binary field
    pub async fn create_photo(store: &dyn DocumentStore, photo: &Photo) -> Result<String, RegistryError> {
        let document = bson::to_document(photo)?;
        let id = store.insert_one(PHOTO_COLLECTION, document).await?;
        Ok(id_to_string(&id))
    }

    /// Get a photo by identifier
    /// DOCUMENTATION: Unknown and malformed identifiers are both NotFound
    pub async fn get_photo(store: &dyn DocumentStore, id: &str) -> Result<Photo, RegistryError> {
        let not_found = || RegistryError::NotFound(format!("photo {}", id));
        let key = parse_object_id(id).ok_or_else(not_found)?;

        let document = store
            .find_one(PHOTO_COLLECTION, &Filter::eq("_id", key))
            .await?
            .ok_or_else(not_found)?;

        Ok(bson::from_document(document)?)
    }
}
