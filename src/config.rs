//! Application-level configuration: backend selection and store construction.

use std::{env, error::Error, sync::Arc};

use thiserror::Error;
use tracing::info;

use crate::dao::card_store::{CardStore, memory::MemoryCardStore};

#[cfg(feature = "firestore-store")]
use crate::dao::card_store::firestore::{FirestoreCardStore, FirestoreConfig};
#[cfg(feature = "mongo-store")]
use crate::dao::card_store::mongodb::{MongoCardStore, MongoConfig};

/// Environment variable selecting the card store backend.
const STORE_ENV: &str = "FLUIR_STORE";

/// Errors raised while loading required configuration.
///
/// These are fatal at startup; nothing in the crate recovers from them at
/// runtime.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The selected backend is not known or not compiled in.
    #[error("unsupported card store backend `{value}` in `{var}`")]
    UnknownStore { var: &'static str, value: String },
    /// The selected backend could not be configured or reached.
    #[error("failed to initialise the `{backend}` card store")]
    StoreInit {
        backend: &'static str,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

/// Supported card store backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Seedable in-memory store for tests and local development.
    Memory,
    /// Firestore REST backend.
    #[cfg(feature = "firestore-store")]
    Firestore,
    /// MongoDB backend.
    #[cfg(feature = "mongo-store")]
    Mongo,
}

/// Immutable runtime configuration resolved once at session start.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Selected card store backend.
    pub store: StoreBackend,
}

impl AppConfig {
    /// Load the configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let value = env::var(STORE_ENV).ok();
        let store = parse_backend(value.as_deref())?;
        Ok(Self { store })
    }

    /// Construct the configured card store backend.
    pub async fn connect_store(&self) -> Result<Arc<dyn CardStore>, ConfigError> {
        match self.store {
            StoreBackend::Memory => {
                info!("using in-memory card store");
                Ok(Arc::new(MemoryCardStore::new()))
            }
            #[cfg(feature = "firestore-store")]
            StoreBackend::Firestore => {
                let config = FirestoreConfig::from_env().map_err(|source| ConfigError::StoreInit {
                    backend: "firestore",
                    source: Box::new(source),
                })?;
                let store =
                    FirestoreCardStore::connect(config)
                        .await
                        .map_err(|source| ConfigError::StoreInit {
                            backend: "firestore",
                            source: Box::new(source),
                        })?;
                Ok(Arc::new(store))
            }
            #[cfg(feature = "mongo-store")]
            StoreBackend::Mongo => {
                let config = MongoConfig::from_env()
                    .await
                    .map_err(|source| ConfigError::StoreInit {
                        backend: "mongo",
                        source: Box::new(source),
                    })?;
                let store =
                    MongoCardStore::connect(config)
                        .await
                        .map_err(|source| ConfigError::StoreInit {
                            backend: "mongo",
                            source: Box::new(source),
                        })?;
                Ok(Arc::new(store))
            }
        }
    }
}

/// Resolve the backend selection, defaulting to Firestore when compiled in.
fn parse_backend(value: Option<&str>) -> Result<StoreBackend, ConfigError> {
    let Some(value) = value.map(str::trim).filter(|value| !value.is_empty()) else {
        #[cfg(feature = "firestore-store")]
        return Ok(StoreBackend::Firestore);
        #[cfg(not(feature = "firestore-store"))]
        return Ok(StoreBackend::Memory);
    };

    match value.to_ascii_lowercase().as_str() {
        "memory" => Ok(StoreBackend::Memory),
        #[cfg(feature = "firestore-store")]
        "firestore" => Ok(StoreBackend::Firestore),
        #[cfg(feature = "mongo-store")]
        "mongo" => Ok(StoreBackend::Mongo),
        other => Err(ConfigError::UnknownStore {
            var: STORE_ENV,
            value: other.to_owned(),
        }),
    }
}
