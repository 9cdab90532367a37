use axum::http::StatusCode;
use std::sync::Arc;

use crate::config::{Config, StoreBackend};
use crate::store::{MessageStore, MongoMessageStore, SqliteMessageStore};

pub mod config;
pub mod controllers;
pub mod error;
pub mod extract;
pub mod routes;
pub mod store;

#[derive(Clone)]
pub struct AppState {
    /// Store creato una volta all'avvio e condiviso da tutti gli handler.
    pub store: Arc<dyn MessageStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn MessageStore>) -> Self {
        Self { store }
    }
}

/// Apre lo store indicato dalla configurazione. Un errore qui è fatale per l'avvio.
pub async fn connect_store(config: &Config) -> anyhow::Result<Arc<dyn MessageStore>> {
    let store: Arc<dyn MessageStore> = match &config.backend {
        StoreBackend::Mongo { uri, database, collection } => {
            Arc::new(MongoMessageStore::connect(uri, database, collection).await?)
        }
        StoreBackend::Sqlite { url } => Arc::new(SqliteMessageStore::connect(url).await?),
    };
    Ok(store)
}

/// Controlla lo stato di salute dello store.
pub async fn health_with_store(store: &dyn MessageStore) -> StatusCode {
    match store.ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "store health check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
