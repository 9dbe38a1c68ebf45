// src/models/photo.rs

use mongodb::bson::oid::ObjectId;
use mongodb::bson::spec::BinarySubtype;
use mongodb::bson::Binary;
use serde::{Deserialize, Serialize};

/// Collection holding uploaded photos
pub const PHOTO_COLLECTION: &str = "photo";

/// Uploaded photo with its raw bytes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Photo {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Original filename
    pub title: String,
    pub data: Binary,
}

impl Photo {
    pub fn new(title: impl Into<String>, bytes: Vec<u8>) -> Self {
        Photo {
            id: None,
            title: title.into(),
            data: Binary {
                subtype: BinarySubtype::Generic,
                bytes,
            },
        }
    }

    /// Content-Disposition value offering the photo as a download
    pub fn content_disposition(&self) -> String {
        let escaped = self.title.replace('\\', "\\\\").replace('"', "\\\"");
        format!("attachment; filename=\"{}\"", escaped)
    }
}
