// src/config/db.rs
// DOCUMENTATION: Document store initialization
// PURPOSE: Build the configured store backend and verify it answers

use crate::config::{Config, StoreBackend};
use crate::db::{DocumentStore, MemoryStore, MongoStore};
use crate::errors::RegistryError;
use mongodb::options::ClientOptions;
use mongodb::Client;
use std::sync::Arc;
use std::time::Duration;

/// Initialize the document store
/// DOCUMENTATION: Called once during application startup in main.rs
/// Returns the shared store used by all repositories
pub async fn init_store(config: &Config) -> Result<Arc<dyn DocumentStore>, RegistryError> {
    let backend = config
        .backend()
        .ok_or_else(|| RegistryError::ValidationError("unknown STORE_BACKEND".to_string()))?;

    let store: Arc<dyn DocumentStore> = match backend {
        StoreBackend::MongoDb => {
            log::info!(
                "Initializing MongoDB client for database '{}'",
                config.database_name
            );
            let client = init_mongo_client(config).await?;
            Arc::new(MongoStore::new(client.database(&config.database_name)))
        }
        StoreBackend::Memory => {
            log::info!("Initializing in-memory document store");
            Arc::new(MemoryStore::new())
        }
    };

    // Verify connection works
    store.ping().await?;

    log::info!("Document store '{}' initialized successfully", store.backend());
    Ok(store)
}

async fn init_mongo_client(config: &Config) -> Result<Client, RegistryError> {
    let mut options = ClientOptions::parse(&config.mongodb_uri)
        .await
        .map_err(|e| RegistryError::StoreUnavailable(format!("Invalid MONGODB_URI: {}", e)))?;

    let timeout = Duration::from_secs(config.db_connection_timeout);
    options.app_name = Some("person-registry".to_string());
    // Maximum concurrent connections
    options.max_pool_size = Some(config.db_max_pool_size);
    options.connect_timeout = Some(timeout);
    options.server_selection_timeout = Some(timeout);
    // Recycle idle connections after 5 minutes
    options.max_idle_time = Some(Duration::from_secs(300));

    Client::with_options(options)
        .map_err(|e| RegistryError::StoreUnavailable(format!("MongoDB client: {}", e)))
}
