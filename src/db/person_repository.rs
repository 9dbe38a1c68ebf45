// src/db/person_repository.rs
// DOCUMENTATION: Person collection access
// PURPOSE: Explicit query functions over the "person" collection

use crate::db::document::{id_to_string, parse_object_id};
use crate::db::filter::{Filter, FindQuery};
use crate::db::pipeline::Pipeline;
use crate::db::store::DocumentStore;
use crate::errors::RegistryError;
use crate::models::{Person, PERSON_COLLECTION};
use mongodb::bson::{self, Bson, Document};
use serde::de::DeserializeOwned;
use std::ops::Bound;

pub struct PersonRepository;

impl PersonRepository {
    /// Insert a person and return the store-assigned identifier
    pub async fn insert(store: &dyn DocumentStore, person: &Person) -> Result<String, RegistryError> {
        let document = bson::to_document(person)?;
        let id = store.insert_one(PERSON_COLLECTION, document).await?;
        let id = id_to_string(&id);
        log::info!("Created person with id: {}", id);
        Ok(id)
    }

    /// Get a person by identifier
    pub async fn get_by_id(store: &dyn DocumentStore, id: &str) -> Result<Person, RegistryError> {
        let not_found = || RegistryError::NotFound(format!("person {}", id));
        let key = parse_object_id(id).ok_or_else(not_found)?;

        let document = store
            .find_one(PERSON_COLLECTION, &Filter::eq("_id", key))
            .await?
            .ok_or_else(not_found)?;
        decode(document)
    }

    /// First names starting with `prefix`, case-sensitive
    pub async fn find_by_first_name_starting_with(
        store: &dyn DocumentStore,
        prefix: &str,
    ) -> Result<Vec<Person>, RegistryError> {
        let query = FindQuery::new(Filter::starts_with("firstName", prefix, false));
        Self::find(store, &query).await
    }

    /// Persons with `min_age < age < max_age`, addresses projected out
    pub async fn find_by_age_between(
        store: &dyn DocumentStore,
        min_age: i32,
        max_age: i32,
    ) -> Result<Vec<Person>, RegistryError> {
        let filter = Filter::range(
            "age",
            Bound::Excluded(Bson::Int32(min_age)),
            Bound::Excluded(Bson::Int32(max_age)),
        );
        let query = FindQuery::new(filter).exclude("addresses");
        Self::find(store, &query).await
    }

    pub async fn find(store: &dyn DocumentStore, query: &FindQuery) -> Result<Vec<Person>, RegistryError> {
        store
            .find(PERSON_COLLECTION, query)
            .await?
            .into_iter()
            .map(decode)
            .collect()
    }

    pub async fn count(store: &dyn DocumentStore, filter: &Filter) -> Result<u64, RegistryError> {
        store.count(PERSON_COLLECTION, filter).await
    }

    /// Run a pipeline over the collection and decode each output row
    pub async fn aggregate<T: DeserializeOwned>(
        store: &dyn DocumentStore,
        pipeline: &Pipeline,
    ) -> Result<Vec<T>, RegistryError> {
        store
            .aggregate(PERSON_COLLECTION, pipeline)
            .await?
            .into_iter()
            .map(|row| bson::from_document(row).map_err(RegistryError::from))
            .collect()
    }
}

fn decode(document: Document) -> Result<Person, RegistryError> {
    Ok(bson::from_document(document)?)
}
