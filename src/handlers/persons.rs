// src/handlers/persons.rs
// DOCUMENTATION: HTTP handlers for person operations
// PURPOSE: Parse requests, call services, return responses

use crate::db::DocumentStore;
use crate::errors::RegistryError;
use crate::models::{
    AgeRangeQuery, CreatePersonRequest, NamePrefixQuery, PageRequest, PersonSearchQuery,
    PERSON_SORT_FIELDS,
};
use crate::services::PersonService;
use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

/// POST /person
/// Create a person, respond with its identifier as plain text
pub async fn create_person(
    store: web::Data<dyn DocumentStore>,
    req: web::Json<CreatePersonRequest>,
) -> Result<impl Responder, RegistryError> {
    let id = PersonService::add_person(store.get_ref(), req.into_inner()).await?;
    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(id))
}

/// GET /person?name=
/// Persons whose first name starts with `name` (all persons when absent)
pub async fn find_by_name_prefix(
    store: web::Data<dyn DocumentStore>,
    query: web::Query<NamePrefixQuery>,
) -> Result<impl Responder, RegistryError> {
    let prefix = query.name.as_deref().unwrap_or("");
    let people = PersonService::get_person_start_with(store.get_ref(), prefix).await?;
    Ok(HttpResponse::Ok().json(people))
}

/// GET /person/age?minAge=&maxAge=
pub async fn find_by_age_range(
    store: web::Data<dyn DocumentStore>,
    query: web::Query<AgeRangeQuery>,
) -> Result<impl Responder, RegistryError> {
    let people =
        PersonService::get_by_person_age(store.get_ref(), query.min_age, query.max_age).await?;
    Ok(HttpResponse::Ok().json(people))
}

/// GET /person/search
/// Optional name/age/city filters, OR-combined, paginated
pub async fn search_persons(
    store: web::Data<dyn DocumentStore>,
    query: web::Query<PersonSearchQuery>,
) -> Result<impl Responder, RegistryError> {
    let query = query.into_inner();
    if let Err(e) = query.validate() {
        return Err(RegistryError::ValidationError(e.to_string()));
    }

    let page = PageRequest::from_params(
        query.page,
        query.size,
        query.sort.as_deref(),
        PERSON_SORT_FIELDS,
    )?;

    let result = PersonService::search(
        store.get_ref(),
        query.name.as_deref(),
        query.min_age,
        query.max_age,
        query.city.as_deref(),
        &page,
    )
    .await?;
    Ok(HttpResponse::Ok().json(result))
}

/// GET /person/oldestPerson
pub async fn oldest_person_by_city(
    store: web::Data<dyn DocumentStore>,
) -> Result<impl Responder, RegistryError> {
    let report = PersonService::get_oldest_person_by_city(store.get_ref()).await?;
    Ok(HttpResponse::Ok().json(report))
}

/// GET /person/populationByCity
pub async fn population_by_city(
    store: web::Data<dyn DocumentStore>,
) -> Result<impl Responder, RegistryError> {
    let report = PersonService::get_population_by_city(store.get_ref()).await?;
    Ok(HttpResponse::Ok().json(report))
}

/// GET /person/{id}
pub async fn get_person(
    store: web::Data<dyn DocumentStore>,
    path: web::Path<String>,
) -> Result<impl Responder, RegistryError> {
    let person = PersonService::get_person(store.get_ref(), &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(person))
}

/// Configuration for person routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/person")
            .route("", web::post().to(create_person))
            .route("", web::get().to(find_by_name_prefix))
            .route("/age", web::get().to(find_by_age_range))
            .route("/search", web::get().to(search_persons))
            .route("/oldestPerson", web::get().to(oldest_person_by_city))
            .route("/populationByCity", web::get().to(population_by_city))
            .route("/{id}", web::get().to(get_person)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{CountUnavailable, MemoryStore};
    use crate::handlers::extractor_config;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::{json, Value};
    use std::sync::Arc;

    #[actix_rt::test]
    async fn test_create_and_query_persons() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::from(store))
                .configure(extractor_config)
                .configure(config),
        )
        .await;

        let mut ids = Vec::new();
        for body in [
            json!({ "firstName": "Alma", "age": 44,
                    "addresses": [ { "city": "Oslo", "address1": "Storgata 1" } ] }),
            json!({ "firstName": "Bert", "age": 23, "addresses": [ { "city": "Oslo" } ] }),
            json!({ "firstName": "Cy", "age": 67, "addresses": [ { "city": "Bergen" } ] }),
        ] {
            let req = test::TestRequest::post()
                .uri("/person")
                .set_json(body)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);
            ids.push(String::from_utf8(test::read_body(resp).await.to_vec()).unwrap());
        }
        let id = &ids[0];

        let req = test::TestRequest::get().uri(&format!("/person/{}", id)).to_request();
        let person: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(person["personId"], id.as_str());
        assert_eq!(person["addresses"][0]["city"], "Oslo");

        let req = test::TestRequest::get().uri("/person?name=Al").to_request();
        let found: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(found.as_array().unwrap().len(), 1);

        let req = test::TestRequest::get()
            .uri("/person/age?minAge=20&maxAge=50")
            .to_request();
        let ranged: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(ranged.as_array().unwrap().len(), 2);
        assert!(ranged[0].get("addresses").is_none());

        let req = test::TestRequest::get()
            .uri("/person/search?name=cy&city=Oslo&size=2&sort=age:desc")
            .to_request();
        let page: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(page["totalElements"], 3);
        assert_eq!(page["totalPages"], 2);
        assert_eq!(page["number"], 0);
        assert_eq!(page["content"][0]["firstName"], "Cy");
        assert_eq!(page["content"][1]["firstName"], "Alma");

        let req = test::TestRequest::get().uri("/person/populationByCity").to_request();
        let population: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(population, json!([ { "city": "Oslo", "count": 2 }, { "city": "Bergen", "count": 1 } ]));

        let req = test::TestRequest::get().uri("/person/oldestPerson").to_request();
        let oldest: Value = test::call_and_read_body_json(&app, req).await;
        let oslo = oldest
            .as_array()
            .unwrap()
            .iter()
            .find(|row| row["city"] == "Oslo")
            .unwrap();
        assert_eq!(oslo["oldestPerson"]["firstName"], "Alma");
        assert_eq!(oslo["oldestPerson"]["addresses"]["city"], "Oslo");
    }

    #[actix_rt::test]
    async fn test_bad_parameters_are_rejected() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::from(store))
                .configure(extractor_config)
                .configure(config),
        )
        .await;

        for uri in [
            "/person/search?size=0",
            "/person/search?sort=salary",
            "/person/search?minAge=abc",
            "/person/age?minAge=3",
        ] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", uri);
        }

        let req = test::TestRequest::get()
            .uri("/person/64b7f0c2a1b2c3d4e5f60718")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_rt::test]
    async fn test_search_maps_store_outage_to_503() {
        let store: Arc<dyn DocumentStore> = Arc::new(CountUnavailable(MemoryStore::new()));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::from(store))
                .configure(extractor_config)
                .configure(config),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/person/search?city=Oslo")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["code"], "STORE_UNAVAILABLE");
        assert!(body["error"]["message"].as_str().is_some());
    }
}
