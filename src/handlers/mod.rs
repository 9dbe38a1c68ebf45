// src/handlers/mod.rs
// DOCUMENTATION: Handlers module organization
// PURPOSE: Re-export handler components

pub mod health;
pub mod persons;
pub mod photos;

pub use health::config as health_config;
pub use persons::config as persons_config;
pub use photos::config as photos_config;

use crate::errors::RegistryError;
use actix_web::web;

/// Route malformed query strings and JSON bodies through RegistryError
pub fn extractor_config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::QueryConfig::default().error_handler(|err, _req| {
        RegistryError::ValidationError(err.to_string()).into()
    }))
    .app_data(web::JsonConfig::default().error_handler(|err, _req| {
        RegistryError::ValidationError(err.to_string()).into()
    }));
}
