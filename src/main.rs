// src/main.rs
// DOCUMENTATION: Application entry point
// PURPOSE: Initialize config, document store, and start HTTP server

mod config;
mod db;
mod errors;
mod handlers;
mod models;
mod services;

use actix_web::{middleware::Logger, web, App, HttpServer};
use config::Config;
use dotenv::dotenv;
use std::io;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // 1. Load environment variables
    dotenv().ok();

    // 2. Load configuration
    let config = Config::from_env();

    // 3. Initialize logging
    if std::env::var("RUST_LOG").is_err() {
        let log_level = if !config.log_level.is_empty() {
            format!("{},actix_web=info,mongodb=warn", config.log_level)
        } else {
            "info,actix_web=info,mongodb=warn".to_string()
        };
        std::env::set_var("RUST_LOG", log_level);
    }
    env_logger::init();

    if let Err(e) = config.validate() {
        log::error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    log::info!("Starting person-registry...");
    log::info!("Environment: {}", config.environment);
    if let Some(backend) = config.backend() {
        log::info!("Store backend: {}", backend.as_str());
    }
    log::info!(
        "Server Address: {}:{}",
        config.server_address,
        config.server_port
    );

    // 4. Initialize document store
    let store = match config::init_store(&config).await {
        Ok(store) => store,
        Err(e) => {
            log::error!("Failed to connect to document store: {}", e);
            std::process::exit(1);
        }
    };

    // 5. Start HTTP server
    let server_addr = format!("{}:{}", config.server_address, config.server_port);
    let config_data = web::Data::new(config);
    let store_data = web::Data::from(store);

    HttpServer::new(move || {
        App::new()
            // Application state (document store and config)
            .app_data(store_data.clone())
            .app_data(config_data.clone())
            // Middleware
            .wrap(Logger::default())
            .wrap(actix_web::middleware::Compress::default())
            // Routes
            .configure(handlers::extractor_config)
            .configure(handlers::health_config)
            .configure(handlers::persons_config)
            .configure(handlers::photos_config)
    })
    .bind(&server_addr)?
    .run()
    .await
}
