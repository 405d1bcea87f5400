//! Pricing Engine
//!
//! The ephemeral, request-scoped cart plus the contract against the
//! storefront's pricing/tax engine. The engine is invoked, never
//! reimplemented: `FlatRatePricing` is the in-memory reference used by
//! tests and the demo server.

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::CatalogStore;
use crate::error::{Result, StoreError};
use crate::model::Jurisdiction;

/// A resolved line inside an ephemeral cart
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: u64,

    /// 0 when the line is not a variation
    pub variation_id: u64,

    pub quantity: u32,

    /// Canonical variation attributes, as stored by the catalog
    pub attributes: HashMap<String, String>,
}

impl CartLine {
    /// Id whose price and stock govern this line
    pub fn priced_id(&self) -> u64 {
        if self.variation_id != 0 {
            self.variation_id
        } else {
            self.product_id
        }
    }
}

/// Request-scoped pricing context
///
/// Constructed fresh per request, populated by the cart builder and
/// discarded once the response is built. Never shared across requests.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Cart {
    pub jurisdiction: Jurisdiction,
    pub lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart for the given jurisdiction
    pub fn new(jurisdiction: Jurisdiction) -> Self {
        Self {
            jurisdiction,
            lines: Vec::new(),
        }
    }

    /// Remove all lines
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total item count (sum of quantities)
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }
}

/// Aggregate totals reported by the pricing engine
///
/// `total` is whatever the engine reports and may be rounded for display
/// depending on engine configuration; callers that need an exact figure
/// must sum the three components themselves.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CartTotals {
    pub contents_total: Decimal,
    pub tax_total: Decimal,
    pub shipping_total: Decimal,
    pub total: Decimal,
}

/// Pricing/tax engine contract
pub trait PricingEngine: Send + Sync {
    /// Validate and add a resolved line to the cart
    ///
    /// Rejects lines the storefront would not sell (unknown product,
    /// insufficient stock). The cart is unchanged on rejection.
    fn add_line(&self, cart: &mut Cart, line: CartLine) -> Result<()>;

    /// Compute aggregate totals for the cart under its jurisdiction
    fn calculate_totals(&self, cart: &Cart) -> Result<CartTotals>;
}

/// Reference pricing engine: per-jurisdiction tax rates and flat
/// per-country shipping, with stock checked through the catalog
pub struct FlatRatePricing {
    catalog: Arc<dyn CatalogStore>,

    /// Rate keyed by "CC" or "CC:SS" (state rates take precedence)
    tax_rates: HashMap<String, Decimal>,

    /// Flat shipping amount keyed by country code
    shipping_rates: HashMap<String, Decimal>,
}

impl FlatRatePricing {
    pub fn new(catalog: Arc<dyn CatalogStore>) -> Self {
        Self {
            catalog,
            tax_rates: HashMap::new(),
            shipping_rates: HashMap::new(),
        }
    }

    /// Register a tax rate (e.g., 0.08 for 8%)
    pub fn with_tax_rate(mut self, country: &str, state: Option<&str>, rate: Decimal) -> Self {
        let key = match state {
            Some(state) => format!("{country}:{state}"),
            None => country.to_string(),
        };
        self.tax_rates.insert(key, rate);
        self
    }

    /// Register a flat shipping amount for a country
    pub fn with_shipping_rate(mut self, country: &str, amount: Decimal) -> Self {
        self.shipping_rates.insert(country.to_string(), amount);
        self
    }

    fn tax_rate(&self, jurisdiction: &Jurisdiction) -> Decimal {
        if !jurisdiction.has_country() {
            return Decimal::ZERO;
        }

        let state_key = format!("{}:{}", jurisdiction.country, jurisdiction.state);
        self.tax_rates
            .get(&state_key)
            .or_else(|| self.tax_rates.get(&jurisdiction.country))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    fn contents_total(&self, cart: &Cart) -> Result<Decimal> {
        let mut contents = Decimal::ZERO;
        for line in &cart.lines {
            let priced = self
                .catalog
                .product(line.priced_id())?
                .ok_or_else(|| StoreError::NotFound(format!("product {}", line.priced_id())))?;
            contents += priced.price * Decimal::from(line.quantity);
        }
        Ok(contents)
    }
}

impl PricingEngine for FlatRatePricing {
    fn add_line(&self, cart: &mut Cart, line: CartLine) -> Result<()> {
        let priced = self
            .catalog
            .product(line.priced_id())?
            .ok_or_else(|| StoreError::NotFound(format!("product {}", line.priced_id())))?;

        if line.quantity == 0 {
            return Err(StoreError::Validation(format!(
                "quantity must be at least 1 for {}",
                priced.sku
            )));
        }

        if !priced.has_stock(line.quantity) {
            return Err(StoreError::OutOfStock {
                sku: priced.sku,
                requested: line.quantity,
            });
        }

        cart.lines.push(line);
        Ok(())
    }

    fn calculate_totals(&self, cart: &Cart) -> Result<CartTotals> {
        let contents_total = self.contents_total(cart)?;

        let tax_total = (contents_total * self.tax_rate(&cart.jurisdiction)).round_dp(2);

        let shipping_total = if cart.is_empty() || !cart.jurisdiction.has_country() {
            Decimal::ZERO
        } else {
            self.shipping_rates
                .get(&cart.jurisdiction.country)
                .copied()
                .unwrap_or(Decimal::ZERO)
        };

        Ok(CartTotals {
            contents_total,
            tax_total,
            shipping_total,
            total: contents_total + tax_total + shipping_total,
        })
    }
}
