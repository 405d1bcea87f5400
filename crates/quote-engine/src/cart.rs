//! Cart Builder
//!
//! Translates a requested jurisdiction plus line-item list into a fresh,
//! request-scoped pricing cart. Lines are resolved and added strictly in
//! input order; any failure aborts the whole build so no partial cart is
//! ever visible to the caller.

use std::sync::Arc;

use commerce_core::{Cart, CartLine, CatalogStore, Jurisdiction, PricingEngine};
use serde::{Deserialize, Serialize};

use crate::error::QuoteError;
use crate::matcher::{SelectionAttributes, resolve_variant};

/// One requested line of a quote
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuoteItem {
    pub sku: String,
    pub quantity: u32,

    /// Selection attributes for variable products
    #[serde(default)]
    pub attributes: SelectionAttributes,
}

/// Builds ephemeral carts from quote requests
pub struct CartBuilder {
    catalog: Arc<dyn CatalogStore>,
    pricing: Arc<dyn PricingEngine>,
}

impl CartBuilder {
    pub fn new(catalog: Arc<dyn CatalogStore>, pricing: Arc<dyn PricingEngine>) -> Self {
        Self { catalog, pricing }
    }

    /// Build a cart for the given jurisdiction and items
    ///
    /// The jurisdiction is fixed on the cart before any line is added, as
    /// tax and shipping computation depend on it. Quantities below 1 are
    /// rejected rather than skipped: the quote must price exactly what was
    /// asked.
    pub fn build(
        &self,
        jurisdiction: Jurisdiction,
        items: &[QuoteItem],
    ) -> Result<Cart, QuoteError> {
        // Always a fresh cart; the explicit clear guards against any future
        // constructor that carries prior state
        let mut cart = Cart::new(jurisdiction);
        cart.clear();

        for item in items {
            if item.quantity < 1 {
                return Err(QuoteError::InvalidQuantity(item.sku.clone()));
            }

            let product_id = self
                .catalog
                .product_id_by_sku(&item.sku)?
                .ok_or_else(|| QuoteError::InvalidSku(item.sku.clone()))?;

            let product = self
                .catalog
                .product(product_id)?
                .ok_or_else(|| QuoteError::InvalidSku(item.sku.clone()))?;

            let resolved = resolve_variant(self.catalog.as_ref(), &product, &item.attributes)?;

            let line = CartLine {
                product_id,
                variation_id: resolved.variation_id,
                quantity: item.quantity,
                attributes: resolved.attributes,
            };

            self.pricing.add_line(&mut cart, line).map_err(|e| {
                QuoteError::AddToCartFailed(format!("{e} (SKU: {})", item.sku))
            })?;

            tracing::debug!(
                sku = %item.sku,
                variation_id = resolved.variation_id,
                quantity = item.quantity,
                "Added line to quote cart"
            );
        }

        Ok(cart)
    }
}
