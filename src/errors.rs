// src/errors.rs
// DOCUMENTATION: Custom error types and HTTP responses
// PURPOSE: Centralized error handling for entire application

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use thiserror::Error;

/// Application-specific error types
/// DOCUMENTATION: Every failure propagates to the HTTP boundary unchanged
/// Each variant maps to appropriate HTTP status code and error response
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Document store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Payload exceeds {0} bytes")]
    PayloadTooLarge(usize),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl RegistryError {
    fn code(&self) -> &'static str {
        match self {
            RegistryError::NotFound(_) => "NOT_FOUND",
            RegistryError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            RegistryError::ValidationError(_) => "VALIDATION_ERROR",
            RegistryError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            RegistryError::InternalError(_) => "INTERNAL_ERROR",
        }
    }
}

/// Convert RegistryError to HTTP response
/// DOCUMENTATION: Maps error types to HTTP status codes and JSON responses
impl ResponseError for RegistryError {
    fn error_response(&self) -> HttpResponse {
        let body = json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
                "timestamp": chrono::Utc::now().to_rfc3339()
            }
        });

        HttpResponse::build(self.status_code()).json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            RegistryError::NotFound(_) => StatusCode::NOT_FOUND,
            RegistryError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            RegistryError::ValidationError(_) => StatusCode::BAD_REQUEST,
            RegistryError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            RegistryError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<mongodb::bson::ser::Error> for RegistryError {
    fn from(e: mongodb::bson::ser::Error) -> Self {
        log::error!("Failed to encode document: {}", e);
        RegistryError::InternalError(e.to_string())
    }
}

impl From<mongodb::bson::de::Error> for RegistryError {
    fn from(e: mongodb::bson::de::Error) -> Self {
        log::error!("Failed to decode document: {}", e);
        RegistryError::InternalError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            RegistryError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            RegistryError::StoreUnavailable("down".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            RegistryError::ValidationError("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RegistryError::PayloadTooLarge(10).status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }

    #[actix_rt::test]
    async fn test_error_body_carries_code() {
        let response = RegistryError::NotFound("photo abc".into()).error_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = actix_web::body::to_bytes(response.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "NOT_FOUND");
        assert_eq!(body["error"]["message"], "Not found: photo abc");
        assert!(body["error"]["timestamp"].as_str().is_some());
    }
}
