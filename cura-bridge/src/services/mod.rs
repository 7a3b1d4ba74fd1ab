//! HTTP adapters for the two external services

pub mod analysis;
pub mod asset_store;

pub use analysis::AnalysisClient;
pub use asset_store::{AssetStoreClient, AssetStoreError};
