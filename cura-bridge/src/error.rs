//! Crate-level error types

use thiserror::Error;

/// Common result type for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Errors that abort a bridge run
///
/// Everything below the batch boundary is recovered locally; only the
/// liveness precondition and startup problems surface here.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Asset store unreachable at batch start; zero items were processed
    #[error("Asset store not reachable at {0} - is the application running?")]
    StoreUnavailable(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
