// src/db/store.rs
// DOCUMENTATION: Document store abstraction
// PURPOSE: Seam between repositories and the concrete database backend

use crate::db::filter::{Filter, FindQuery};
use crate::db::pipeline::Pipeline;
use crate::errors::RegistryError;
use async_trait::async_trait;
use mongodb::bson::{Bson, Document};

/// Interface for a collection-oriented document database.
///
/// Implementations:
/// - `MongoStore`: MongoDB through the official driver
/// - `MemoryStore`: in-process collections, used for local runs and tests
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a document, assigning `_id` when absent. Returns the `_id`.
    async fn insert_one(&self, collection: &str, document: Document) -> Result<Bson, RegistryError>;

    /// Sorted, windowed and projected query
    async fn find(&self, collection: &str, query: &FindQuery) -> Result<Vec<Document>, RegistryError>;

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>, RegistryError>;

    /// Number of documents matching the filter, ignoring any window
    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, RegistryError>;

    async fn aggregate(&self, collection: &str, pipeline: &Pipeline) -> Result<Vec<Document>, RegistryError>;

    /// Round trip to verify the backend answers
    async fn ping(&self) -> Result<(), RegistryError>;

    /// Backend name for logging
    fn backend(&self) -> &'static str;
}
