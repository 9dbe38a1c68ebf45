// src/handlers/health.rs
// DOCUMENTATION: Health check handler
// PURPOSE: Report service status and whether the document store answers

use crate::db::DocumentStore;
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

pub async fn health_check(store: web::Data<dyn DocumentStore>) -> impl Responder {
    let (mut response, store_status) = match store.ping().await {
        Ok(()) => (HttpResponse::Ok(), "ok"),
        Err(e) => {
            log::warn!("Health check could not reach the store: {}", e);
            (HttpResponse::ServiceUnavailable(), "unavailable")
        }
    };

    response.json(json!({
        "status": if store_status == "ok" { "ok" } else { "degraded" },
        "service": "person-registry",
        "version": env!("CARGO_PKG_VERSION"),
        "store": {
            "backend": store.backend(),
            "status": store_status
        }
    }))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check));
}
