// src/db/mod.rs
// DOCUMENTATION: Database module organization
// PURPOSE: Re-export database components

pub mod document;
pub mod filter;
pub mod memory_store;
pub mod mongo_store;
pub mod person_repository;
pub mod photo_repository;
pub mod pipeline;
pub mod store;

pub use filter::{Filter, FindQuery, SortField};
pub use memory_store::MemoryStore;
#[cfg(test)]
pub use memory_store::CountUnavailable;
pub use mongo_store::MongoStore;
pub use person_repository::*;
pub use photo_repository::*;
pub use pipeline::{Accumulator, Pipeline, Projection};
pub use store::DocumentStore;
