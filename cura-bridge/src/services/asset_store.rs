//! Asset store HTTP client
//!
//! Thin typed client over the asset store's local API. Every operation
//! swallows transport errors into an explicit absent/failure value after
//! logging; the sync engine decides what an absence means. No retries are
//! performed at this layer.

use crate::types::{AssetItem, AssetStore, ServiceInfo};
use serde::Deserialize;
use serde_json::json;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::error;

/// Asset store client errors
///
/// Internal to the client: the trait surface converts these into
/// absent/failure values after logging.
#[derive(Debug, Error)]
pub enum AssetStoreError {
    /// Transport-level failure (connection refused, timeout, ...)
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status from the store
    #[error("Asset store returned {0}: {1}")]
    Api(u16, String),

    /// Response body could not be decoded
    #[error("Failed to decode asset store response: {0}")]
    Decode(String),
}

/// Response envelope for `GET /info`
#[derive(Debug, Deserialize)]
struct InfoResponse {
    data: ServiceInfo,
}

/// Response envelope for `GET /item/list`; a missing `data` list decodes as
/// an empty page
#[derive(Debug, Deserialize)]
struct ItemListResponse {
    #[serde(default)]
    data: Vec<AssetItem>,
}

/// Response envelope for `GET /item/info`
#[derive(Debug, Deserialize)]
struct ItemInfoResponse {
    #[serde(default)]
    data: ItemInfoData,
}

#[derive(Debug, Default, Deserialize)]
struct ItemInfoData {
    #[serde(rename = "filePath")]
    file_path: Option<String>,
}

/// Asset store API client
pub struct AssetStoreClient {
    http_client: reqwest::Client,
    base_url: String,
    folders: Option<String>,
}

impl AssetStoreClient {
    /// Create a new client for the given API base URL
    ///
    /// `timeout` bounds every request when set (the store is a local
    /// application, so the default is unconstrained). `folders` restricts
    /// the item listing to the given comma-separated folder ids.
    pub fn new(
        base_url: &str,
        timeout: Option<Duration>,
        folders: Option<String>,
    ) -> Result<Self, AssetStoreError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| AssetStoreError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            folders,
        })
    }

    async fn fetch_info(&self) -> Result<ServiceInfo, AssetStoreError> {
        let response = self
            .http_client
            .get(format!("{}/info", self.base_url))
            .send()
            .await
            .map_err(|e| AssetStoreError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AssetStoreError::Api(status.as_u16(), body));
        }

        let info: InfoResponse = response
            .json()
            .await
            .map_err(|e| AssetStoreError::Decode(e.to_string()))?;
        Ok(info.data)
    }

    async fn fetch_items(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<AssetItem>, AssetStoreError> {
        let mut query: Vec<(&str, String)> = vec![
            ("limit", limit.to_string()),
            ("offset", offset.to_string()),
            ("orderBy", "-createdAt".to_string()),
        ];
        if let Some(folders) = &self.folders {
            query.push(("folders", folders.clone()));
        }

        let response = self
            .http_client
            .get(format!("{}/item/list", self.base_url))
            .query(&query)
            .send()
            .await
            .map_err(|e| AssetStoreError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AssetStoreError::Api(status.as_u16(), body));
        }

        let list: ItemListResponse = response
            .json()
            .await
            .map_err(|e| AssetStoreError::Decode(e.to_string()))?;
        Ok(list.data)
    }

    async fn fetch_file_path(&self, item_id: &str) -> Result<Option<String>, AssetStoreError> {
        let response = self
            .http_client
            .get(format!("{}/item/info", self.base_url))
            .query(&[("id", item_id)])
            .send()
            .await
            .map_err(|e| AssetStoreError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AssetStoreError::Api(status.as_u16(), body));
        }

        let info: ItemInfoResponse = response
            .json()
            .await
            .map_err(|e| AssetStoreError::Decode(e.to_string()))?;
        Ok(info.data.file_path)
    }

    /// Each field update is a separate `POST /item/update` call; the store
    /// documents no batching
    async fn post_update(&self, payload: serde_json::Value) -> Result<(), AssetStoreError> {
        let response = self
            .http_client
            .post(format!("{}/item/update", self.base_url))
            .json(&payload)
            .send()
            .await
            .map_err(|e| AssetStoreError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AssetStoreError::Api(status.as_u16(), body));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl AssetStore for AssetStoreClient {
    async fn service_info(&self) -> Option<ServiceInfo> {
        match self.fetch_info().await {
            Ok(info) => Some(info),
            Err(e) => {
                error!("Failed to connect to asset store: {}", e);
                None
            }
        }
    }

    async fn list_items(&self, limit: usize, offset: usize) -> Vec<AssetItem> {
        match self.fetch_items(limit, offset).await {
            Ok(items) => items,
            Err(e) => {
                error!(offset, "Failed to list items: {}", e);
                Vec::new()
            }
        }
    }

    async fn item_file_path(&self, item_id: &str) -> Option<PathBuf> {
        match self.fetch_file_path(item_id).await {
            Ok(path) => path.map(PathBuf::from),
            Err(e) => {
                error!(item_id, "Failed to get item info: {}", e);
                None
            }
        }
    }

    async fn update_tags(&self, item_id: &str, tags: &[String]) -> bool {
        match self.post_update(json!({ "id": item_id, "tags": tags })).await {
            Ok(()) => true,
            Err(e) => {
                error!(item_id, "Failed to update tags: {}", e);
                false
            }
        }
    }

    async fn update_rating(&self, item_id: &str, rating: u8) -> bool {
        match self.post_update(json!({ "id": item_id, "star": rating })).await {
            Ok(()) => true,
            Err(e) => {
                error!(item_id, "Failed to update rating: {}", e);
                false
            }
        }
    }

    async fn update_annotation(&self, item_id: &str, annotation: &str) -> bool {
        match self
            .post_update(json!({ "id": item_id, "annotation": annotation }))
            .await
        {
            Ok(()) => true,
            Err(e) => {
                error!(item_id, "Failed to update annotation: {}", e);
                false
            }
        }
    }
}
