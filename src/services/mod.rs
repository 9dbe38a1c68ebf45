// src/services/mod.rs
// DOCUMENTATION: Services module organization
// PURPOSE: Re-export service components

pub mod person_service;
pub mod photo_service;

pub use person_service::PersonService;
pub use photo_service::PhotoService;
