// src/db/mongo_store.rs
// DOCUMENTATION: MongoDB implementation of DocumentStore
// PURPOSE: Translate filters and pipelines into driver calls

use crate::db::filter::{sort_document, Filter, FindQuery};
use crate::db::pipeline::Pipeline;
use crate::db::store::DocumentStore;
use crate::errors::RegistryError;
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use mongodb::{Collection, Database};

pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.db.collection::<Document>(name)
    }
}

/// Driver failures are connectivity problems from the caller's point of view
fn unavailable(operation: &'static str, collection: &str, e: mongodb::error::Error) -> RegistryError {
    log::error!("MongoDB {} on '{}' failed: {}", operation, collection, e);
    RegistryError::StoreUnavailable(format!("{} failed: {}", operation, e))
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn insert_one(&self, collection: &str, document: Document) -> Result<Bson, RegistryError> {
        let result = self
            .collection(collection)
            .insert_one(document)
            .await
            .map_err(|e| unavailable("insert", collection, e))?;

        Ok(result.inserted_id)
    }

    async fn find(&self, collection: &str, query: &FindQuery) -> Result<Vec<Document>, RegistryError> {
        let filter = query.filter.to_document();
        log::debug!("find on '{}': {}", collection, filter);

        let coll = self.collection(collection);
        let mut action = coll.find(filter).skip(query.skip);
        if !query.sort.is_empty() {
            action = action.sort(sort_document(&query.sort));
        }
        if let Some(limit) = query.limit {
            action = action.limit(limit as i64);
        }
        if let Some(projection) = query.projection() {
            action = action.projection(projection);
        }

        let cursor = action
            .await
            .map_err(|e| unavailable("find", collection, e))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| unavailable("find", collection, e))
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>, RegistryError> {
        self.collection(collection)
            .find_one(filter.to_document())
            .await
            .map_err(|e| unavailable("find_one", collection, e))
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, RegistryError> {
        self.collection(collection)
            .count_documents(filter.to_document())
            .await
            .map_err(|e| unavailable("count", collection, e))
    }

    async fn aggregate(&self, collection: &str, pipeline: &Pipeline) -> Result<Vec<Document>, RegistryError> {
        let stages = pipeline.to_documents();
        log::debug!("aggregate on '{}': {:?}", collection, stages);

        let cursor = self
            .collection(collection)
            .aggregate(stages)
            .await
            .map_err(|e| unavailable("aggregate", collection, e))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| unavailable("aggregate", collection, e))
    }

    async fn ping(&self) -> Result<(), RegistryError> {
        self.db
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| unavailable("ping", self.db.name(), e))?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "mongodb"
    }
}
