//! Error Types
//!
//! Each variant carries a stable machine-readable code and an HTTP status,
//! so transport layers can map failures without string-matching messages.

use commerce_core::StoreError;
use thiserror::Error;

/// Errors from quote construction (attribute matching, cart building,
/// total calculation)
#[derive(Error, Debug)]
pub enum QuoteError {
    /// SKU does not exist in the catalog
    #[error("Product not found: {0}")]
    InvalidSku(String),

    /// Variable product quoted without selection attributes
    #[error("Attributes required for variable product: {0}")]
    MissingAttributes(String),

    /// No variation matches the supplied attributes
    #[error("Variation not found for the provided attributes: {0}")]
    NoVariationMatch(String),

    /// Line quantity below 1
    #[error("Quantity must be at least 1: {0}")]
    InvalidQuantity(String),

    /// The pricing engine rejected the line (e.g., stock unavailable)
    #[error("Failed to add item to cart: {0}")]
    AddToCartFailed(String),

    /// Unexpected collaborator failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl QuoteError {
    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            QuoteError::InvalidSku(_) => "invalid_sku",
            QuoteError::MissingAttributes(_) => "missing_attributes",
            QuoteError::NoVariationMatch(_) => "no_variation",
            QuoteError::InvalidQuantity(_) => "invalid_quantity",
            QuoteError::AddToCartFailed(_) => "add_to_cart_failed",
            QuoteError::Store(_) => "x402_store_error",
        }
    }

    /// HTTP status this error maps to
    pub fn status(&self) -> u16 {
        match self {
            QuoteError::InvalidSku(_) => 404,
            QuoteError::MissingAttributes(_)
            | QuoteError::NoVariationMatch(_)
            | QuoteError::InvalidQuantity(_)
            | QuoteError::AddToCartFailed(_) => 400,
            QuoteError::Store(_) => 500,
        }
    }
}

/// Errors from order materialization
#[derive(Error, Debug)]
pub enum OrderError {
    /// Order requested with no line items
    #[error("Line items are required")]
    MissingLineItems,

    /// A line item references an unknown product (strict policy only)
    #[error("Unresolvable line item: product {0}")]
    UnresolvedLine(u64),

    /// The ledger failed to persist the assembled order
    #[error("Order creation failed: {0}")]
    Create(String),

    /// Collaborator failure during assembly or persistence
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl OrderError {
    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            OrderError::MissingLineItems => "x402_missing_items",
            OrderError::UnresolvedLine(_) => "x402_unresolved_line",
            OrderError::Create(_) | OrderError::Store(_) => "x402_order_error",
        }
    }

    /// HTTP status this error maps to
    pub fn status(&self) -> u16 {
        match self {
            OrderError::MissingLineItems | OrderError::UnresolvedLine(_) => 400,
            OrderError::Create(_) | OrderError::Store(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_error_codes() {
        assert_eq!(QuoteError::InvalidSku("X".into()).code(), "invalid_sku");
        assert_eq!(QuoteError::InvalidSku("X".into()).status(), 404);
        assert_eq!(QuoteError::NoVariationMatch("X".into()).status(), 400);
    }

    #[test]
    fn test_order_error_codes() {
        assert_eq!(OrderError::MissingLineItems.code(), "x402_missing_items");
        assert_eq!(OrderError::MissingLineItems.status(), 400);
        assert_eq!(OrderError::Create("boom".into()).status(), 500);
    }
}
