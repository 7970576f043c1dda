use std::time::Duration;

use super::error::{FirestoreError, FirestoreResult};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Runtime configuration describing how to reach the Firestore project.
#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    pub project_id: String,
    pub api_key: Option<String>,
    /// Re-list interval used by the watch path.
    pub poll_interval: Duration,
    /// Override of the REST endpoint, mainly for the local emulator.
    pub base_url: Option<String>,
}

impl FirestoreConfig {
    /// Construct a configuration for the given project.
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            api_key: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            base_url: None,
        }
    }

    /// Attach the web API key sent with every request.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Override the watch re-list interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Build a configuration by reading the expected environment variables.
    pub fn from_env() -> FirestoreResult<Self> {
        let project_id =
            std::env::var("FLUIR_FIREBASE_PROJECT_ID").map_err(|_| FirestoreError::MissingEnvVar {
                var: "FLUIR_FIREBASE_PROJECT_ID",
            })?;

        let mut config = Self::new(project_id);

        if let Ok(api_key) = std::env::var("FLUIR_FIREBASE_API_KEY") {
            config = config.with_api_key(api_key);
        }

        if let Ok(value) = std::env::var("FLUIR_FIRESTORE_POLL_MS") {
            let millis = value
                .parse::<u64>()
                .map_err(|_| FirestoreError::InvalidEnvVar {
                    var: "FLUIR_FIRESTORE_POLL_MS",
                    value,
                })?;
            config = config.with_poll_interval(Duration::from_millis(millis));
        }

        if let Ok(base_url) = std::env::var("FLUIR_FIRESTORE_BASE_URL") {
            config.base_url = Some(base_url);
        }

        Ok(config)
    }

    /// REST endpoint the document paths are appended to.
    pub fn resolve_base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_owned(),
            None => format!(
                "https://firestore.googleapis.com/v1/projects/{}/databases/(default)/documents",
                self.project_id
            ),
        }
    }
}
