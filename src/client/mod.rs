//! HTTP client for the dashboard data service.
//!
//! Every call is a single GET/POST with no retry. The grouped dashboard data
//! is cached for a fixed window; failures are never cached.

pub mod cache;
pub mod table;

pub use cache::CacheEntry;
pub use table::Table;

use crate::api::{ErrorResponse, HealthResponse, ReloadResponse};
use crate::config::ClientConfig;
use crate::storage::Item;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Could not connect to the data service at {base_url}. Make sure it is running.")]
    Connection { base_url: String },

    #[error("Data service returned status {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
}

impl ClientError {
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub struct DashboardClient {
    http: Client,
    base_url: String,
    cache_window: Duration,
    cache: Mutex<Option<CacheEntry<Table>>>,
}

impl DashboardClient {
    pub fn new(base_url: &str, cache_window: Duration, timeout: Duration) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            cache_window,
            cache: Mutex::new(None),
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        Self::new(&config.base_url, config.cache_window(), config.timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn fetch_health(&self) -> Result<HealthResponse, ClientError> {
        self.get_json("/").await
    }

    pub async fn fetch_item(&self, id: i64) -> Result<Item, ClientError> {
        self.get_json(&format!("/api/v1/item/{}", id)).await
    }

    /// Grouped counts as a table. On failure returns an empty table and the error.
    pub async fn fetch_dashboard_data(&self) -> (Table, Option<ClientError>) {
        self.fetch_dashboard_data_at(Instant::now()).await
    }

    /// Same as [`fetch_dashboard_data`](Self::fetch_dashboard_data) with an explicit clock reading
    pub async fn fetch_dashboard_data_at(&self, now: Instant) -> (Table, Option<ClientError>) {
        let mut cache = self.cache.lock().await;

        if let Some(entry) = cache.as_ref() {
            if entry.is_fresh(now, self.cache_window) {
                debug!("Dashboard data served from cache");
                return (entry.value.clone(), None);
            }
        }

        match self
            .get_json::<BTreeMap<String, u64>>("/api/v1/dashboard/data")
            .await
        {
            Ok(counts) => {
                let table = Table::from_counts(&counts);
                *cache = Some(CacheEntry::new(table.clone(), now));
                (table, None)
            }
            Err(e) => {
                warn!(error = %e, "Dashboard data fetch failed");
                (Table::empty(), Some(e))
            }
        }
    }

    /// Row preview, never cached. `limit = 0` asks for every row.
    pub async fn fetch_dashboard_rows(
        &self,
        limit: Option<usize>,
        derived: bool,
    ) -> Result<Table, ClientError> {
        let mut path = format!("/api/v1/dashboard/rows?derived={}", derived);
        if let Some(limit) = limit {
            path.push_str(&format!("&limit={}", limit));
        }

        let records: Vec<Map<String, Value>> = self.get_json(&path).await?;
        Ok(Table::from_records(&records))
    }

    /// Ask the service to re-read its data file. Drops the local cache on success.
    pub async fn reload_dataset(&self) -> Result<ReloadResponse, ClientError> {
        let url = format!("{}/api/v1/dashboard/reload", self.base_url);
        let response = self.http.post(&url).send().await.map_err(|e| self.map_send_error(e))?;
        let reloaded = self.decode(response).await?;
        self.invalidate_cache().await;
        Ok(reloaded)
    }

    pub async fn invalidate_cache(&self) {
        *self.cache.lock().await = None;
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "GET");

        let response = self.http.get(&url).send().await.map_err(|e| self.map_send_error(e))?;
        self.decode(response).await
    }

    async fn decode<T: DeserializeOwned>(&self, response: Response) -> Result<T, ClientError> {
        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(ClientError::Status { status, message });
        }

        Ok(response.json().await?)
    }

    fn map_send_error(&self, e: reqwest::Error) -> ClientError {
        if e.is_connect() {
            ClientError::Connection {
                base_url: self.base_url.clone(),
            }
        } else {
            ClientError::Request(e)
        }
    }
}
