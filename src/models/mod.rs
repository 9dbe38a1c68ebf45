// src/models/mod.rs
// DOCUMENTATION: Models module organization
// PURPOSE: Re-export model components

pub mod page;
pub mod person;
pub mod photo;

pub use page::*;
pub use person::*;
pub use photo::*;
