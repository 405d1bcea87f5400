//! Error Types

use thiserror::Error;

/// Result type alias for storefront collaborator operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors surfaced by the catalog, pricing engine and order ledger
#[derive(Error, Debug)]
pub enum StoreError {
    /// Requested record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Not enough stock to satisfy a requested quantity
    #[error("Out of stock: {sku} (requested {requested})")]
    OutOfStock { sku: String, requested: u32 },

    /// Input rejected by a collaborator
    #[error("Validation error: {0}")]
    Validation(String),

    /// Persistence failure in the order ledger
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Storage(_))
    }
}
