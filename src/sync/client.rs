//! HTTP record sync client

use crate::producers::{Meal, MoodEntry, RecordSync};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Remote sync settings (`[sync]` in the config file)
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct SyncConfig {
    /// Sync is off unless explicitly enabled
    #[serde(default)]
    pub enabled: bool,

    /// Document store root (e.g., "https://records.example.com/v1")
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Owner of the synced records
    #[serde(default = "default_user_id")]
    pub user_id: String,

    /// Request timeout in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Attempts per record before giving up
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_user_id() -> String {
    "default-user".to_string()
}

fn default_request_timeout_ms() -> u64 {
    5000
}

fn default_max_retries() -> u32 {
    3
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: default_base_url(),
            user_id: default_user_id(),
            request_timeout_ms: default_request_timeout_ms(),
            max_retries: default_max_retries(),
        }
    }
}

/// Errors that can occur when syncing records
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Sync target unavailable")]
    Unavailable,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Sync rejected with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Request timeout")]
    Timeout,

    #[error("Rate limited")]
    RateLimited,

    #[error("Invalid sync configuration: {0}")]
    InvalidConfig(String),
}

/// [`RecordSync`] over HTTP PUTs
pub struct HttpRecordSync {
    client: Client,
    config: SyncConfig,
}

impl HttpRecordSync {
    pub fn new(config: SyncConfig) -> Result<Self, SyncError> {
        if config.base_url.trim().is_empty() {
            return Err(SyncError::InvalidConfig("base_url is empty".to_string()));
        }
        if config.user_id.trim().is_empty() {
            return Err(SyncError::InvalidConfig("user_id is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self { client, config })
    }

    /// Client for an enabled config, `None` when sync is switched off
    pub fn from_config(config: &SyncConfig) -> Result<Option<Self>, SyncError> {
        if !config.enabled {
            return Ok(None);
        }
        Self::new(config.clone()).map(Some)
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Document URL for a record in a user collection
    pub fn record_url(&self, collection: &str, id: Uuid) -> String {
        format!(
            "{}/users/{}/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.user_id,
            collection,
            id
        )
    }

    /// PUT with retry on transport errors and rate limiting
    async fn send_put<T: Serialize + Sync>(&self, url: &str, body: &T) -> Result<(), SyncError> {
        let mut last_error = SyncError::Unavailable;

        for attempt in 0..self.config.max_retries.max(1) {
            if attempt > 0 {
                // Quadratic backoff: 1s, 4s, 9s...
                let delay = Duration::from_secs((attempt as u64).pow(2));
                tokio::time::sleep(delay).await;
            }

            match self.client.put(url).json(body).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        tracing::debug!(url, attempt, "Synced record");
                        return Ok(());
                    } else if status.as_u16() == 429 {
                        last_error = SyncError::RateLimited;
                        continue;
                    } else {
                        let body = response.text().await.unwrap_or_default();
                        return Err(SyncError::Status {
                            status: status.as_u16(),
                            body,
                        });
                    }
                }
                Err(e) => {
                    tracing::debug!(url, attempt, error = %e, "Sync attempt failed");
                    last_error = if e.is_timeout() {
                        SyncError::Timeout
                    } else if e.is_connect() {
                        SyncError::Unavailable
                    } else {
                        SyncError::Request(e)
                    };
                }
            }
        }

        Err(last_error)
    }
}

#[async_trait]
impl RecordSync for HttpRecordSync {
    async fn sync_meal(&self, meal: &Meal) -> Result<(), SyncError> {
        let url = self.record_url("meals", meal.id);
        self.send_put(&url, meal).await
    }

    async fn sync_mood(&self, entry: &MoodEntry) -> Result<(), SyncError> {
        let url = self.record_url("moodEntries", entry.id);
        self.send_put(&url, entry).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::{MoodSource, MoodState};
    use axum::{extract::Path, http::StatusCode, routing::put, Json, Router};
    use std::sync::{Arc, Mutex};

    type Received = Arc<Mutex<Vec<(String, serde_json::Value)>>>;

    /// Local document store recording every PUT
    async fn spawn_store(status: StatusCode) -> (String, Received) {
        let received: Received = Arc::default();
        let log = received.clone();

        let app = Router::new().route(
            "/users/:user/:collection/:id",
            put(move |Path((user, collection, id)): Path<(String, String, String)>,
                      Json(body): Json<serde_json::Value>| {
                let log = log.clone();
                async move {
                    if let Ok(mut log) = log.lock() {
                        log.push((format!("{}/{}/{}", user, collection, id), body));
                    }
                    status
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        (format!("http://{}", addr), received)
    }

    fn config(base_url: &str) -> SyncConfig {
        SyncConfig {
            enabled: true,
            base_url: base_url.to_string(),
            user_id: "u1".to_string(),
            request_timeout_ms: 2000,
            max_retries: 1,
        }
    }

    #[test]
    fn test_default_config() {
        let config = SyncConfig::default();
        assert!(!config.enabled);
        assert_eq!(config.user_id, "default-user");
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn test_disabled_config_builds_nothing() {
        assert!(HttpRecordSync::from_config(&SyncConfig::default())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_empty_user_rejected() {
        let mut config = config("http://localhost:1");
        config.user_id = " ".to_string();
        assert!(matches!(
            HttpRecordSync::new(config),
            Err(SyncError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_record_url() {
        let sync = HttpRecordSync::new(config("http://store.local/")).unwrap();
        let id = Uuid::nil();
        assert_eq!(
            sync.record_url("meals", id),
            "http://store.local/users/u1/meals/00000000-0000-0000-0000-000000000000"
        );
    }

    #[tokio::test]
    async fn test_sync_meal_and_mood() {
        let (base_url, received) = spawn_store(StatusCode::OK).await;
        let sync = HttpRecordSync::new(config(&base_url)).unwrap();

        let meal = Meal::new(Some("Pizza".to_string()), "dinner", 1_000);
        let entry = MoodEntry::new(MoodState::Sad, 60, 2_000, MoodSource::Manual);
        sync.sync_meal(&meal).await.unwrap();
        sync.sync_mood(&entry).await.unwrap();

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 2);
        assert_eq!(received[0].0, format!("u1/meals/{}", meal.id));
        assert_eq!(received[0].1["foodType"], "Pizza");
        assert_eq!(received[1].0, format!("u1/moodEntries/{}", entry.id));
        assert_eq!(received[1].1["mood"], "Sad");
    }

    #[tokio::test]
    async fn test_rejected_status_is_reported() {
        let (base_url, _) = spawn_store(StatusCode::FORBIDDEN).await;
        let sync = HttpRecordSync::new(config(&base_url)).unwrap();

        let err = sync
            .sync_meal(&Meal::new(None, "", 1_000))
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Status { status: 403, .. }));
    }
}
