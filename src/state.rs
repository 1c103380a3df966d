use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::store::{ContactStore, StoreConfig};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Contact storage handle (shared across requests)
    pub store: Arc<dyn ContactStore>,
}

impl ServerState {
    /// Create server state backed by MongoDB per the configuration.
    pub async fn new(config: ServerConfig) -> ServerResult<Self> {
        let store = StoreConfig::mongo(&config.mongo_uri, &config.database)
            .build()
            .await?;
        Ok(Self {
            config: Arc::new(config),
            store,
        })
    }

    /// Create server state around an already-built store. Tests use this
    /// with the in-memory backend.
    pub fn with_store(config: ServerConfig, store: Arc<dyn ContactStore>) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }
}
