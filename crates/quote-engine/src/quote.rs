//! Quote Calculator
//!
//! Triggers the pricing engine's aggregate computation over a built cart
//! and assembles the normalized quote response.

use commerce_core::{Cart, PricingEngine};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::QuoteError;

/// Authoritative quote for a prospective cart
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Quote {
    pub total: Decimal,
    pub contents_total: Decimal,
    pub tax_total: Decimal,
    pub shipping_total: Decimal,

    /// Store-level active currency, independent of cart values
    pub currency: String,
}

/// Compute a quote from a built cart
///
/// The engine's own `total` field is deliberately ignored: depending on
/// configuration it can come back pre-formatted for display and lossy. The
/// grand total is always the exact sum of the three raw components.
pub fn calculate(
    pricing: &dyn PricingEngine,
    cart: &Cart,
    currency: &str,
) -> Result<Quote, QuoteError> {
    let totals = pricing.calculate_totals(cart)?;

    Ok(Quote {
        total: totals.contents_total + totals.tax_total + totals.shipping_total,
        contents_total: totals.contents_total,
        tax_total: totals.tax_total,
        shipping_total: totals.shipping_total,
        currency: currency.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use commerce_core::{CartLine, CartTotals, Jurisdiction, Result as StoreResult};
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    /// Engine whose reported total is rounded for display
    struct RoundingEngine;

    impl PricingEngine for RoundingEngine {
        fn add_line(&self, cart: &mut Cart, line: CartLine) -> StoreResult<()> {
            cart.lines.push(line);
            Ok(())
        }

        fn calculate_totals(&self, _cart: &Cart) -> StoreResult<CartTotals> {
            Ok(CartTotals {
                contents_total: dec!(20.00),
                tax_total: dec!(1.60),
                shipping_total: dec!(0.00),
                // Display-rounded, as some engine configurations return
                total: dec!(22),
            })
        }
    }

    fn cart() -> Cart {
        let mut cart = Cart::new(Jurisdiction::country("US"));
        cart.lines.push(CartLine {
            product_id: 1,
            variation_id: 0,
            quantity: 2,
            attributes: HashMap::new(),
        });
        cart
    }

    #[test]
    fn test_total_is_sum_of_parts_not_engine_total() {
        let quote = calculate(&RoundingEngine, &cart(), "USD").unwrap();

        assert_eq!(quote.total, dec!(21.60));
        assert_eq!(quote.contents_total, dec!(20.00));
        assert_eq!(quote.tax_total, dec!(1.60));
        assert_eq!(quote.shipping_total, dec!(0.00));
        assert_eq!(quote.currency, "USD");
    }

    #[test]
    fn test_end_to_end_us_quote() {
        use crate::cart::{CartBuilder, QuoteItem};
        use commerce_core::{FlatRatePricing, MemoryCatalog, Product};
        use std::sync::Arc;

        let catalog = Arc::new(MemoryCatalog::new());
        catalog.insert(Product::simple(1, "WIDGET-1", "Widget", dec!(10.00)));

        let pricing =
            Arc::new(FlatRatePricing::new(catalog.clone()).with_tax_rate("US", None, dec!(0.08)));

        let cart = CartBuilder::new(catalog, pricing.clone())
            .build(
                Jurisdiction::country("US"),
                &[QuoteItem {
                    sku: "WIDGET-1".into(),
                    quantity: 2,
                    attributes: HashMap::new(),
                }],
            )
            .unwrap();

        let quote = calculate(pricing.as_ref(), &cart, "USD").unwrap();
        assert_eq!(quote.contents_total, dec!(20.00));
        assert_eq!(quote.tax_total, dec!(1.60));
        assert_eq!(quote.shipping_total, dec!(0.00));
        assert_eq!(quote.total, dec!(21.60));
        assert_eq!(quote.currency, "USD");
    }

    #[test]
    fn test_invariant_holds() {
        let quote = calculate(&RoundingEngine, &cart(), "USD").unwrap();
        assert_eq!(
            quote.total,
            quote.contents_total + quote.tax_total + quote.shipping_total
        );
    }
}
