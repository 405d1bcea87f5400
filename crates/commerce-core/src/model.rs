//! Domain Models
//!
//! Core data types for the storefront: products, jurisdictions, addresses
//! and orders. Uses `rust_decimal` for all monetary values - never use f64
//! for money!

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Product kind, matching the catalog's type taxonomy
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    /// Standalone purchasable product
    Simple,

    /// Parent product with selectable attribute combinations
    Variable,

    /// Concrete child of a variable product
    Variation,
}

impl ProductType {
    pub fn as_str(&self) -> &str {
        match self {
            ProductType::Simple => "simple",
            ProductType::Variable => "variable",
            ProductType::Variation => "variation",
        }
    }
}

/// An attribute a variable product can be selected by
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AttributeDef {
    /// Attribute name (e.g., "pa_size" or "Color")
    pub name: String,

    /// Allowed values, in display order
    pub options: Vec<String>,
}

/// Immutable product snapshot read from the catalog store
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Product {
    /// Catalog identifier
    pub id: u64,

    /// Stock-keeping unit (empty for some variations)
    pub sku: String,

    /// Display name
    pub name: String,

    /// Product kind
    #[serde(rename = "type")]
    pub product_type: ProductType,

    /// Current sale price
    pub price: Decimal,

    /// Undiscounted price
    pub regular_price: Decimal,

    /// Tax class (empty = standard)
    #[serde(default)]
    pub tax_class: String,

    /// Managed stock quantity (None = not stock-managed)
    pub stock: Option<i64>,

    /// Whether the product is featured on the storefront
    #[serde(default)]
    pub featured: bool,

    /// Parent product id (variations only, 0 otherwise)
    #[serde(default)]
    pub parent_id: u64,

    /// Selectable attributes (variable products)
    #[serde(default)]
    pub attributes: Vec<AttributeDef>,

    /// Stored attribute assignment, keyed `attribute_<slug>` or
    /// `attribute_pa_<slug>`; an empty value means "any" (variations only)
    #[serde(default)]
    pub variation_attributes: HashMap<String, String>,

    /// Child variation ids (variable products)
    #[serde(default)]
    pub variations: Vec<u64>,

    /// Primary image URL
    #[serde(default)]
    pub image: Option<String>,
}

impl Product {
    /// Create a simple product with sensible defaults
    pub fn simple(id: u64, sku: impl Into<String>, name: impl Into<String>, price: Decimal) -> Self {
        Self {
            id,
            sku: sku.into(),
            name: name.into(),
            product_type: ProductType::Simple,
            price,
            regular_price: price,
            tax_class: String::new(),
            stock: None,
            featured: false,
            parent_id: 0,
            attributes: Vec::new(),
            variation_attributes: HashMap::new(),
            variations: Vec::new(),
            image: None,
        }
    }

    /// Whether the requested quantity can be satisfied from stock
    pub fn has_stock(&self, quantity: u32) -> bool {
        match self.stock {
            Some(available) => available >= i64::from(quantity),
            None => true,
        }
    }
}

/// Tax/shipping jurisdiction supplied with a quote request
///
/// Empty strings mean "not supplied"; `country` governs whether the
/// jurisdiction is applied at all.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jurisdiction {
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub postcode: String,
    #[serde(default)]
    pub city: String,
}

impl Jurisdiction {
    pub fn country(country: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            ..Self::default()
        }
    }

    /// Whether a country was supplied
    pub fn has_country(&self) -> bool {
        !self.country.is_empty()
    }
}

/// Billing or shipping address attached to an order
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub address_1: String,
    #[serde(default)]
    pub address_2: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub postcode: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

/// Order lifecycle status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    Pending,
    Processing,
    OnHold,
    Completed,
    Cancelled,
    Refunded,
    Failed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::OnHold => "on-hold",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Refunded => "refunded",
            OrderStatus::Failed => "failed",
        }
    }
}

/// A shipping charge attached to an order
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ShippingLine {
    pub method_title: String,
    pub method_id: String,
    pub total: Decimal,
}

impl Default for ShippingLine {
    fn default() -> Self {
        Self {
            method_title: "Flat Rate".into(),
            method_id: "flat_rate".into(),
            total: Decimal::ZERO,
        }
    }
}

/// Arbitrary key/value metadata on an order (transaction id, chain id,
/// wallet address, ...)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MetaEntry {
    pub key: String,
    pub value: serde_json::Value,
}

/// A purchased line on a persisted order
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: u64,

    /// 0 when the line is not a variation
    pub variation_id: u64,

    pub name: String,
    pub sku: String,
    pub quantity: u32,

    /// Unit price at order time
    pub price: Decimal,

    /// Line total (price * quantity)
    pub total: Decimal,
}

/// A persisted order, owned by the order ledger after creation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Order {
    /// Ledger identifier (assigned on create)
    pub id: u64,

    pub status: OrderStatus,

    /// Opaque key for customer-facing order URLs
    pub order_key: String,

    pub currency: String,
    pub total: Decimal,
    pub tax_total: Decimal,
    pub line_items: Vec<OrderLine>,
    pub billing: Option<Address>,
    pub shipping: Option<Address>,
    pub shipping_lines: Vec<ShippingLine>,
    pub payment_method: String,
    pub payment_method_title: String,
    pub customer_note: String,

    /// Channel that created the order
    pub created_via: String,

    pub meta_data: Vec<MetaEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Create an unsaved order shell in the given status
    pub fn new(status: OrderStatus, currency: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            status,
            order_key: String::new(),
            currency: currency.into(),
            total: Decimal::ZERO,
            tax_total: Decimal::ZERO,
            line_items: Vec::new(),
            billing: None,
            shipping: None,
            shipping_lines: Vec::new(),
            payment_method: String::new(),
            payment_method_title: String::new(),
            customer_note: String::new(),
            created_via: "x402_agent_gateway".into(),
            meta_data: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Look up a metadata value by key
    pub fn meta(&self, key: &str) -> Option<&serde_json::Value> {
        self.meta_data
            .iter()
            .find(|m| m.key == key)
            .map(|m| &m.value)
    }
}

/// Store-level settings surfaced through the context endpoint
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoreSettings {
    pub name: String,

    /// Active currency code, stamped on quotes and orders
    pub currency: String,

    pub weight_unit: String,
    pub dimension_unit: String,

    /// ISO country codes the store ships to
    pub shipping_countries: Vec<String>,

    pub returns_policy: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            name: "Storefront".into(),
            currency: "USD".into(),
            weight_unit: "kg".into(),
            dimension_unit: "cm".into(),
            shipping_countries: Vec::new(),
            returns_policy: "Please contact store for return policy.".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_simple_product_defaults() {
        let product = Product::simple(1, "WIDGET-1", "Widget", dec!(10.00));
        assert_eq!(product.product_type, ProductType::Simple);
        assert_eq!(product.regular_price, dec!(10.00));
        assert!(product.has_stock(100));
    }

    #[test]
    fn test_stock_check() {
        let mut product = Product::simple(1, "WIDGET-1", "Widget", dec!(10.00));
        product.stock = Some(3);
        assert!(product.has_stock(3));
        assert!(!product.has_stock(4));
    }

    #[test]
    fn test_order_status_wire_format() {
        let json = serde_json::to_string(&OrderStatus::OnHold).unwrap();
        assert_eq!(json, "\"on-hold\"");
        assert_eq!(OrderStatus::OnHold.as_str(), "on-hold");
    }

    #[test]
    fn test_order_meta_lookup() {
        let mut order = Order::new(OrderStatus::Pending, "USD");
        order.meta_data.push(MetaEntry {
            key: "x402_transaction_id".into(),
            value: serde_json::json!("0xabc123"),
        });

        assert_eq!(
            order.meta("x402_transaction_id"),
            Some(&serde_json::json!("0xabc123"))
        );
        assert!(order.meta("chain").is_none());
    }
}
