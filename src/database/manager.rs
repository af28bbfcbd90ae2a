use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{DatabaseConfig, StoreBackend};
use crate::filter::FilterError;

use super::memory::MemoryStore;
use super::models::{Item, User};
use super::postgres::PgDocumentStore;
use super::repository::Record;
use super::store::DocumentStore;

/// Errors from the document store and its connection manager
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Invalid collection name: {0}")]
    InvalidCollection(String),

    #[error("Corrupt document in {collection}: {message}")]
    Corrupt { collection: String, message: String },

    #[error("Gave up connecting after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Opens the configured document store, retrying while it is unreachable.
pub struct DatabaseManager {
    config: DatabaseConfig,
}

impl DatabaseManager {
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }

    /// Connect with a fixed wait between attempts and a capped attempt count,
    /// then make sure every collection and its indexes exist.
    pub async fn connect(&self) -> Result<Arc<dyn DocumentStore>, DatabaseError> {
        let max_attempts = self.config.connect_max_attempts.max(1);
        let wait = Duration::from_secs(self.config.connect_retry_secs);
        let mut attempt = 0;

        let store = loop {
            attempt += 1;
            info!(
                "Connecting to {} store (attempt {}/{})",
                self.describe_target(),
                attempt,
                max_attempts
            );

            match self.connect_once().await {
                Ok(store) => break store,
                // A bad URL will not fix itself; fail immediately
                Err(e @ (DatabaseError::ConfigMissing(_) | DatabaseError::InvalidDatabaseUrl)) => {
                    return Err(e)
                }
                Err(e) if attempt >= max_attempts => {
                    return Err(DatabaseError::RetriesExhausted {
                        attempts: attempt,
                        last_error: e.to_string(),
                    });
                }
                Err(e) => {
                    warn!("Store not reachable yet: {}; retrying in {:?}", e, wait);
                    tokio::time::sleep(wait).await;
                }
            }
        };

        Self::ensure_collections(store.as_ref()).await?;
        info!("Store ready");
        Ok(store)
    }

    async fn connect_once(&self) -> Result<Arc<dyn DocumentStore>, DatabaseError> {
        match self.config.backend {
            StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),
            StoreBackend::Postgres => {
                let url = self
                    .config
                    .url
                    .as_deref()
                    .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;
                url::Url::parse(url).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;

                let pool = PgPoolOptions::new()
                    .max_connections(self.config.max_connections)
                    .acquire_timeout(Duration::from_secs(5))
                    .connect(url)
                    .await?;
                let store = PgDocumentStore::new(pool);
                store.ping().await?;
                Ok(Arc::new(store))
            }
        }
    }

    async fn ensure_collections(store: &dyn DocumentStore) -> Result<(), DatabaseError> {
        store.ensure_collection(User::COLLECTION).await?;
        store.ensure_collection(Item::COLLECTION).await?;
        Ok(())
    }

    /// Human-readable target for logs, with any password removed.
    fn describe_target(&self) -> String {
        match (&self.config.backend, &self.config.url) {
            (StoreBackend::Memory, _) => "in-memory".to_string(),
            (StoreBackend::Postgres, Some(url)) => redact_url(url),
            (StoreBackend::Postgres, None) => "postgres (no DATABASE_URL)".to_string(),
        }
    }
}

fn redact_url(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(mut url) => {
            if url.password().is_some() {
                let _ = url.set_password(Some("****"));
            }
            url.into()
        }
        Err(_) => "postgres (unparseable DATABASE_URL)".to_string(),
    }
}
