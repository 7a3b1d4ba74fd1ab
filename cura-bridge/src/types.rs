//! Core types and trait definitions for the bridge
//!
//! The two external services are modeled as traits so the sync engine can be
//! driven against in-memory fakes without a network stack. The reqwest
//! adapters in `services` are the concrete implementations used by the
//! binary.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Asset store types
// ============================================================================

/// Asset store service metadata from `GET /info`
///
/// Used only as a liveness probe before a batch starts; the version is
/// logged when present.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceInfo {
    /// Asset store application version (e.g. "3.0.0")
    pub version: Option<String>,
}

/// One item from the asset store's list endpoint
///
/// Transient read-only view; the store owns the record. Unknown response
/// fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetItem {
    /// Opaque item identifier
    pub id: String,
    /// Display name, used for log traceability
    #[serde(default)]
    pub name: String,
}

// ============================================================================
// Analysis service types
// ============================================================================

/// Classification returned by the analysis service for one file
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AnalysisResult {
    /// Content tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Aesthetic score in [0, 10]; 0 when absent
    #[serde(default)]
    pub aesthetic: f64,
    /// Optional structured analysis; a malformed value is treated as absent
    #[serde(default, deserialize_with = "lenient_details")]
    pub analysis: Option<AnalysisDetails>,
}

/// Structured analysis fields (all optional)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AnalysisDetails {
    /// Detected subjects, folded into the tag set
    pub subjects: Option<Vec<String>>,
    /// Dominant visual style, folded into the tag set
    pub visual_style: Option<String>,
    /// Free-text summary, written back as the item annotation
    pub summary: Option<String>,
}

/// Deserialize `analysis` tolerantly: anything that is not the expected
/// object shape decodes as `None` instead of failing the whole result.
fn lenient_details<'de, D>(deserializer: D) -> Result<Option<AnalysisDetails>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Analysis service errors
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Transport-level failure (connection refused, timeout, ...)
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status from the service
    #[error("Analysis service returned {0}: {1}")]
    Api(u16, String),

    /// Response body could not be decoded
    #[error("Failed to decode analysis response: {0}")]
    Decode(String),
}

// ============================================================================
// Service traits
// ============================================================================

/// Asset store capability surface
///
/// Transport errors never propagate through this trait: implementations log
/// them with the asset id and return the explicit absent/failure value.
/// Retry policy, if any, belongs to the caller.
#[async_trait::async_trait]
pub trait AssetStore: Send + Sync {
    /// Liveness probe. `None` means the store is unreachable or not running.
    async fn service_info(&self) -> Option<ServiceInfo>;

    /// One page of items, newest first. Network or decode failure yields an
    /// empty page.
    async fn list_items(&self, limit: usize, offset: usize) -> Vec<AssetItem>;

    /// Resolve the local file path for an item. `None` means the item has no
    /// resolvable file and must be skipped.
    async fn item_file_path(&self, item_id: &str) -> Option<PathBuf>;

    /// Write the item's tags. Returns write success.
    async fn update_tags(&self, item_id: &str, tags: &[String]) -> bool;

    /// Set the item's star rating (1-5). Returns write success.
    async fn update_rating(&self, item_id: &str, rating: u8) -> bool;

    /// Set the item's annotation text. Returns write success.
    async fn update_annotation(&self, item_id: &str, annotation: &str) -> bool;
}

/// Content analysis capability surface
#[async_trait::async_trait]
pub trait Analyzer: Send + Sync {
    /// Submit file bytes for classification.
    ///
    /// `Ok(None)` means the service filtered the file out; that is a skip,
    /// not an error.
    async fn analyze(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Option<AnalysisResult>, AnalysisError>;
}
