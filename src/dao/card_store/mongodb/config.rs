use mongodb::options::ClientOptions;

use super::error::{MongoDaoError, MongoResult};

/// Runtime configuration describing how to connect to MongoDB.
#[derive(Clone)]
pub struct MongoConfig {
    pub options: ClientOptions,
    pub database_name: String,
}

impl MongoConfig {
    /// Parse a connection URI into client options.
    pub async fn from_uri(uri: &str, db_name: Option<&str>) -> MongoResult<Self> {
        let database_name = db_name.unwrap_or("fluir").to_owned();
        let options =
            ClientOptions::parse(uri)
                .await
                .map_err(|source| MongoDaoError::InvalidUri {
                    uri: uri.to_owned(),
                    source,
                })?;

        Ok(Self {
            options,
            database_name,
        })
    }

    /// Build a configuration by reading the expected environment variables.
    pub async fn from_env() -> MongoResult<Self> {
        let uri = std::env::var("FLUIR_MONGO_URI").map_err(|_| MongoDaoError::MissingEnvVar {
            var: "FLUIR_MONGO_URI",
        })?;
        let db = std::env::var("FLUIR_MONGO_DB").ok();
        Self::from_uri(&uri, db.as_deref()).await
    }
}
