// src/db/memory_store.rs
// DOCUMENTATION: In-process implementation of DocumentStore
// PURPOSE: Evaluate filters and pipelines without a database server

use crate::db::filter::{compare_by, Filter, FindQuery};
use crate::db::pipeline::Pipeline;
use crate::db::store::DocumentStore;
use crate::errors::RegistryError;
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{Bson, Document};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Collections keyed by name, documents kept in insertion order
#[derive(Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<String, Vec<Document>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert_one(&self, collection: &str, document: Document) -> Result<Bson, RegistryError> {
        let id = document
            .get("_id")
            .cloned()
            .unwrap_or_else(|| Bson::ObjectId(ObjectId::new()));

        let mut stored = Document::new();
        stored.insert("_id", id.clone());
        for (key, value) in document {
            if key != "_id" {
                stored.insert(key, value);
            }
        }

        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .push(stored);
        Ok(id)
    }

    async fn find(&self, collection: &str, query: &FindQuery) -> Result<Vec<Document>, RegistryError> {
        let matcher = query.filter.matcher();
        let collections = self.collections.read().await;
        let mut matched: Vec<Document> = collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| matcher.matches(doc))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        drop(collections);

        if !query.sort.is_empty() {
            matched.sort_by(|a, b| compare_by(a, b, &query.sort));
        }

        let window = matched.into_iter().skip(query.skip as usize);
        let mut page: Vec<Document> = match query.limit {
            Some(limit) => window.take(limit as usize).collect(),
            None => window.collect(),
        };

        for doc in page.iter_mut() {
            for field in &query.exclude {
                doc.remove(field);
            }
        }

        Ok(page)
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>, RegistryError> {
        let matcher = filter.matcher();
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| matcher.matches(doc)).cloned()))
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, RegistryError> {
        let matcher = filter.matcher();
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| docs.iter().filter(|doc| matcher.matches(doc)).count() as u64)
            .unwrap_or(0))
    }

    async fn aggregate(&self, collection: &str, pipeline: &Pipeline) -> Result<Vec<Document>, RegistryError> {
        let rows = {
            let collections = self.collections.read().await;
            collections.get(collection).cloned().unwrap_or_default()
        };
        Ok(pipeline.apply(rows))
    }

    async fn ping(&self) -> Result<(), RegistryError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

/// MemoryStore whose `count` always fails as if the server were unreachable
#[cfg(test)]
pub struct CountUnavailable(pub MemoryStore);

#[cfg(test)]
#[async_trait]
impl DocumentStore for CountUnavailable {
    async fn insert_one(&self, collection: &str, document: Document) -> Result<Bson, RegistryError> {
        self.0.insert_one(collection, document).await
    }

    async fn find(&self, collection: &str, query: &FindQuery) -> Result<Vec<Document>, RegistryError> {
        self.0.find(collection, query).await
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>, RegistryError> {
        self.0.find_one(collection, filter).await
    }

    async fn count(&self, _collection: &str, _filter: &Filter) -> Result<u64, RegistryError> {
        Err(RegistryError::StoreUnavailable("connection refused".to_string()))
    }

    async fn aggregate(&self, collection: &str, pipeline: &Pipeline) -> Result<Vec<Document>, RegistryError> {
        self.0.aggregate(collection, pipeline).await
    }

    async fn ping(&self) -> Result<(), RegistryError> {
        self.0.ping().await
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
