// src/services/person_service.rs
// DOCUMENTATION: Business logic for persons
// PURPOSE: Build search filters and report pipelines, shape responses

use crate::db::{
    Accumulator, DocumentStore, Filter, FindQuery, PersonRepository, Pipeline, Projection,
    SortField,
};
use crate::errors::RegistryError;
use crate::models::{
    CityPopulation, CreatePersonRequest, OldestPersonByCity, OldestPersonDocument, Page,
    PageRequest, PersonResponse,
};
use mongodb::bson::Bson;
use std::ops::Bound;

pub struct PersonService;

impl PersonService {
    /// Store a new person, returning its identifier
    pub async fn add_person(
        store: &dyn DocumentStore,
        req: CreatePersonRequest,
    ) -> Result<String, RegistryError> {
        PersonRepository::insert(store, &req.into_person()).await
    }

    pub async fn get_person(store: &dyn DocumentStore, id: &str) -> Result<PersonResponse, RegistryError> {
        let person = PersonRepository::get_by_id(store, id).await?;
        Ok(person.to_response())
    }

    /// Persons whose first name starts with `prefix`
    pub async fn get_person_start_with(
        store: &dyn DocumentStore,
        prefix: &str,
    ) -> Result<Vec<PersonResponse>, RegistryError> {
        let people = PersonRepository::find_by_first_name_starting_with(store, prefix).await?;
        Ok(people.iter().map(|p| p.to_response()).collect())
    }

    /// Persons strictly between the two ages, without addresses
    pub async fn get_by_person_age(
        store: &dyn DocumentStore,
        min_age: i32,
        max_age: i32,
    ) -> Result<Vec<PersonResponse>, RegistryError> {
        let people = PersonRepository::find_by_age_between(store, min_age, max_age).await?;
        Ok(people.iter().map(|p| p.to_response()).collect())
    }

    /// Combined search filter.
    /// Active criteria are OR-ed: a person matching any one of them is returned.
    pub fn search_filter(
        name: Option<&str>,
        min_age: Option<i32>,
        max_age: Option<i32>,
        city: Option<&str>,
    ) -> Filter {
        let mut criteria = Vec::new();

        if let Some(name) = name.filter(|n| !n.is_empty()) {
            criteria.push(Filter::starts_with("firstName", name, true));
        }

        // Inclusive on both ends, unlike find_by_age_between
        if let (Some(min), Some(max)) = (min_age, max_age) {
            criteria.push(Filter::range(
                "age",
                Bound::Included(Bson::Int32(min)),
                Bound::Included(Bson::Int32(max)),
            ));
        }

        if let Some(city) = city.filter(|c| !c.is_empty()) {
            criteria.push(Filter::eq("addresses.city", city));
        }

        Filter::any_of(criteria)
    }

    /// Paginated search
    /// DOCUMENTATION: The page and the total are two separate store calls;
    /// they can disagree if the collection changes in between
    pub async fn search(
        store: &dyn DocumentStore,
        name: Option<&str>,
        min_age: Option<i32>,
        max_age: Option<i32>,
        city: Option<&str>,
        page: &PageRequest,
    ) -> Result<Page<PersonResponse>, RegistryError> {
        let filter = Self::search_filter(name, min_age, max_age, city);
        log::debug!("Person search filter: {:?}", filter);

        let query = FindQuery::new(filter)
            .sort(page.sort.clone())
            .window(page.offset(), page.size);

        let people = PersonRepository::find(store, &query).await?;
        let total = PersonRepository::count(store, &query.filter).await?;

        Ok(Page::new(people, page, total).map(|p| p.to_response()))
    }

    /// unwind addresses, sort by age desc, first row per city, rename key
    pub fn oldest_person_pipeline() -> Pipeline {
        Pipeline::new()
            .unwind("addresses")
            .sort(vec![SortField::desc("age")])
            .group(
                "addresses.city",
                vec![("oldestPerson", Accumulator::FirstRoot)],
            )
            .project(vec![
                Projection::Computed {
                    name: "city".to_string(),
                    from: "_id".to_string(),
                },
                Projection::Include("oldestPerson".to_string()),
                Projection::Exclude("_id".to_string()),
            ])
    }

    /// unwind addresses, count rows per city, sort by count desc, rename key
    pub fn population_pipeline() -> Pipeline {
        Pipeline::new()
            .unwind("addresses")
            .group("addresses.city", vec![("popCount", Accumulator::Count)])
            .sort(vec![SortField::desc("popCount")])
            .project(vec![
                Projection::Computed {
                    name: "city".to_string(),
                    from: "_id".to_string(),
                },
                Projection::Computed {
                    name: "count".to_string(),
                    from: "popCount".to_string(),
                },
                Projection::Exclude("_id".to_string()),
            ])
    }

    pub async fn get_oldest_person_by_city(
        store: &dyn DocumentStore,
    ) -> Result<Vec<OldestPersonByCity>, RegistryError> {
        let rows: Vec<OldestPersonDocument> =
            PersonRepository::aggregate(store, &Self::oldest_person_pipeline()).await?;
        Ok(rows.iter().map(|r| r.to_response()).collect())
    }

    /// Population counts address occurrences, not distinct persons
    pub async fn get_population_by_city(
        store: &dyn DocumentStore,
    ) -> Result<Vec<CityPopulation>, RegistryError> {
        PersonRepository::aggregate(store, &Self::population_pipeline()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{CountUnavailable, MemoryStore};
    use crate::models::Address;
    use mongodb::bson::doc;

    fn request(name: &str, age: i32, cities: &[&str]) -> CreatePersonRequest {
        CreatePersonRequest {
            first_name: name.to_string(),
            last_name: None,
            age,
            addresses: cities
                .iter()
                .map(|c| Address {
                    address1: None,
                    address2: None,
                    city: c.to_string(),
                })
                .collect(),
        }
    }

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        for req in [
            request("Alice", 52, &["Oslo"]),
            request("Sal", 24, &["Rome"]),
            request("albert", 61, &["Oslo", "Rome"]),
            request("Bob", 35, &["Lima"]),
            request("Cleo", 28, &[]),
            request("Dora", 70, &["Lima", "Lima"]),
        ] {
            PersonService::add_person(&store, req).await.unwrap();
        }
        store
    }

    fn names(items: &[PersonResponse]) -> Vec<&str> {
        items.iter().map(|p| p.first_name.as_str()).collect()
    }

    #[test]
    fn test_search_filter_combines_with_or() {
        let filter = PersonService::search_filter(Some("Al"), Some(20), Some(30), Some("Oslo"));
        assert_eq!(
            filter.to_document(),
            doc! { "$or": [
                { "firstName": { "$regex": "^Al", "$options": "i" } },
                { "age": { "$gte": 20, "$lte": 30 } },
                { "addresses.city": "Oslo" }
            ] }
        );
    }

    #[test]
    fn test_search_filter_ignores_empty_and_half_ranges() {
        assert_eq!(
            PersonService::search_filter(Some(""), Some(20), None, Some("")),
            Filter::All
        );
        assert_eq!(
            PersonService::search_filter(None, None, None, None),
            Filter::All
        );
    }

    #[tokio::test]
    async fn test_search_without_filters_returns_everything_sorted() {
        let store = seeded().await;
        let page = PageRequest::new(0, 10, vec![SortField::asc("age")]);

        let result = PersonService::search(&store, None, None, None, None, &page)
            .await
            .unwrap();

        assert_eq!(result.total_elements, 6);
        assert_eq!(result.total_pages, 1);
        assert_eq!(
            names(&result.content),
            vec!["Sal", "Cleo", "Bob", "Alice", "albert", "Dora"]
        );
    }

    #[tokio::test]
    async fn test_search_is_union_of_name_and_age() {
        let store = seeded().await;
        let page = PageRequest::new(0, 10, vec![SortField::asc("firstName")]);

        let result = PersonService::search(&store, Some("Al"), Some(20), Some(30), None, &page)
            .await
            .unwrap();

        // Alice, albert by name; Sal and Cleo by age (24, 28)
        assert_eq!(names(&result.content), vec!["Alice", "Cleo", "Sal", "albert"]);
        assert_eq!(result.total_elements, 4);
    }

    #[tokio::test]
    async fn test_search_name_is_a_prefix() {
        let store = seeded().await;
        let page = PageRequest::new(0, 10, Vec::new());

        let result = PersonService::search(&store, Some("al"), None, None, None, &page)
            .await
            .unwrap();

        // "Sal" contains "al" but does not start with it
        assert_eq!(names(&result.content), vec!["Alice", "albert"]);
    }

    #[tokio::test]
    async fn test_search_total_is_independent_of_window() {
        let store = seeded().await;

        for (index, size) in [(0, 1), (1, 2), (5, 3)] {
            let page = PageRequest::new(index, size, vec![SortField::desc("age")]);
            let result = PersonService::search(&store, None, None, None, Some("Lima"), &page)
                .await
                .unwrap();
            assert_eq!(result.total_elements, 2);
            assert_eq!(result.number, index);
            assert!(result.content.len() as u64 <= size);
        }

        let second = PageRequest::new(1, 1, vec![SortField::desc("age")]);
        let result = PersonService::search(&store, None, None, None, Some("Lima"), &second)
            .await
            .unwrap();
        assert_eq!(names(&result.content), vec!["Bob"]);
        assert_eq!(result.total_pages, 2);
    }

    #[tokio::test]
    async fn test_search_fails_when_count_is_unavailable() {
        let store = CountUnavailable(seeded().await);
        let page = PageRequest::new(0, 5, Vec::new());

        let result = PersonService::search(&store, Some("Al"), None, None, None, &page).await;
        assert!(matches!(result, Err(RegistryError::StoreUnavailable(_))));

        // Non-count operations still go through
        let found = PersonService::get_person_start_with(&store, "Al").await.unwrap();
        assert_eq!(names(&found), vec!["Alice"]);
    }

    #[tokio::test]
    async fn test_population_by_city() {
        let store = seeded().await;
        let report = PersonService::get_population_by_city(&store).await.unwrap();

        // Pairs: Oslo x2, Rome x2, Lima x3 (Dora lists Lima twice)
        let total: i64 = report.iter().map(|c| c.count).sum();
        assert_eq!(total, 7);
        assert_eq!(
            report[0],
            CityPopulation {
                city: Some("Lima".into()),
                count: 3
            }
        );
        assert!(report.windows(2).all(|w| w[0].count >= w[1].count));
        assert_eq!(report.len(), 3);
    }

    #[tokio::test]
    async fn test_oldest_person_by_city() {
        let store = seeded().await;
        let report = PersonService::get_oldest_person_by_city(&store)
            .await
            .unwrap();

        assert_eq!(report.len(), 3);
        let oldest = |city: &str| {
            report
                .iter()
                .find(|r| r.city.as_deref() == Some(city))
                .map(|r| (r.oldest_person.first_name.clone(), r.oldest_person.age))
                .unwrap()
        };
        assert_eq!(oldest("Oslo"), ("albert".to_string(), 61));
        assert_eq!(oldest("Rome"), ("albert".to_string(), 61));
        assert_eq!(oldest("Lima"), ("Dora".to_string(), 70));

        let oslo = report
            .iter()
            .find(|r| r.city.as_deref() == Some("Oslo"))
            .unwrap();
        assert_eq!(oslo.oldest_person.addresses.city, "Oslo");
    }

    #[tokio::test]
    async fn test_age_range_and_prefix_shapes() {
        let store = seeded().await;

        let ranged = PersonService::get_by_person_age(&store, 24, 52).await.unwrap();
        assert_eq!(names(&ranged), vec!["Bob", "Cleo"]);
        assert!(ranged.iter().all(|p| p.addresses.is_none()));

        let prefixed = PersonService::get_person_start_with(&store, "Al").await.unwrap();
        assert_eq!(names(&prefixed), vec!["Alice"]);
    }
}
