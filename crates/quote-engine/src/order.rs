//! Order Materializer
//!
//! Turns a validated line-item list into a persisted order: resolves each
//! line by product/variation id (the caller already knows concrete ids on
//! this path, so no attribute matching happens here), attaches addresses,
//! shipping lines, payment identifiers and settlement metadata, recomputes
//! totals from scratch and hands the order to the ledger.

use std::sync::Arc;

use commerce_core::{
    Address, Cart, CartLine, CatalogStore, Jurisdiction, MetaEntry, Order, OrderLedger, OrderLine,
    OrderStatus, PricingEngine, ShippingLine,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::OrderError;

/// What to do with a line item whose product cannot be resolved
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnresolvedLinePolicy {
    /// Best-effort: drop the line, keep the order, report it in the
    /// summary's `skipped` list
    #[default]
    SkipUnresolvedLines,

    /// Strict: fail the whole order on the first unresolvable line
    FailOnUnresolved,
}

/// One requested order line, by concrete catalog ids
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(default)]
    pub product_id: u64,

    /// Set when the caller is ordering a specific variation
    #[serde(default)]
    pub variation_id: u64,

    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

/// Requested shipping charge; unspecified fields fall back to a flat-rate
/// placeholder
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ShippingLineRequest {
    pub method_title: Option<String>,
    pub method_id: Option<String>,
    pub total: Option<Decimal>,
}

/// Order creation request
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CreateOrder {
    #[serde(default)]
    pub line_items: Vec<OrderItem>,

    pub billing: Option<Address>,
    pub shipping: Option<Address>,

    #[serde(default)]
    pub shipping_lines: Vec<ShippingLineRequest>,

    pub payment_method: Option<String>,
    pub payment_method_title: Option<String>,

    /// Settlement metadata: transaction id, chain id, wallet address, ...
    #[serde(default)]
    pub meta_data: Vec<MetaEntry>,

    /// Caller explicitly marks the order as already paid
    #[serde(default)]
    pub set_paid: bool,

    pub customer_note: Option<String>,
}

/// A line dropped under `SkipUnresolvedLines`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SkippedLine {
    pub product_id: u64,
    pub variation_id: u64,
    pub reason: String,
}

/// Summary returned to the caller after persistence
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OrderSummary {
    pub id: u64,
    pub status: OrderStatus,
    pub order_key: String,
    pub total: Decimal,
    pub currency: String,

    /// Lines dropped during best-effort assembly (empty under strict policy)
    pub skipped: Vec<SkippedLine>,
}

/// Creates persisted orders from agent requests
pub struct OrderMaterializer {
    catalog: Arc<dyn CatalogStore>,
    pricing: Arc<dyn PricingEngine>,
    ledger: Arc<dyn OrderLedger>,
    policy: UnresolvedLinePolicy,
    currency: String,
}

impl OrderMaterializer {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        pricing: Arc<dyn PricingEngine>,
        ledger: Arc<dyn OrderLedger>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            catalog,
            pricing,
            ledger,
            policy: UnresolvedLinePolicy::default(),
            currency: currency.into(),
        }
    }

    /// Override the unresolved-line policy
    pub fn with_policy(mut self, policy: UnresolvedLinePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Create and persist an order
    ///
    /// Fails with `MissingLineItems` before any persistence when the line
    /// list is empty. Initial status comes from the `set_paid` input flag,
    /// never inferred from payment data. Totals are recomputed from catalog
    /// prices plus jurisdiction tax over the resolved lines; caller-supplied
    /// totals are never trusted.
    pub fn create(&self, request: CreateOrder) -> Result<OrderSummary, OrderError> {
        if request.line_items.is_empty() {
            return Err(OrderError::MissingLineItems);
        }

        let status = if request.set_paid {
            OrderStatus::Processing
        } else {
            OrderStatus::Pending
        };

        let mut order = Order::new(status, &self.currency);
        let mut skipped = Vec::new();

        for item in &request.line_items {
            match self.resolve_line(item)? {
                Some(line) => order.line_items.push(line),
                None => match self.policy {
                    UnresolvedLinePolicy::SkipUnresolvedLines => {
                        tracing::warn!(
                            product_id = item.product_id,
                            variation_id = item.variation_id,
                            "Skipping unresolvable order line"
                        );
                        skipped.push(SkippedLine {
                            product_id: item.product_id,
                            variation_id: item.variation_id,
                            reason: "product not found".into(),
                        });
                    }
                    UnresolvedLinePolicy::FailOnUnresolved => {
                        return Err(OrderError::UnresolvedLine(target_id(item)));
                    }
                },
            }
        }

        order.billing = request.billing;
        order.shipping = request.shipping;

        for line in &request.shipping_lines {
            let defaults = ShippingLine::default();
            order.shipping_lines.push(ShippingLine {
                method_title: line.method_title.clone().unwrap_or(defaults.method_title),
                method_id: line.method_id.clone().unwrap_or(defaults.method_id),
                total: line.total.unwrap_or(defaults.total),
            });
        }

        if let Some(method) = request.payment_method {
            order.payment_method = method;
        }
        if let Some(title) = request.payment_method_title {
            order.payment_method_title = title;
        }
        if let Some(note) = request.customer_note {
            order.customer_note = note;
        }
        order.meta_data = request.meta_data;

        self.recalculate_totals(&mut order)?;

        let saved = self
            .ledger
            .create(order)
            .map_err(|e| OrderError::Create(e.to_string()))?;

        tracing::info!(
            order_id = saved.id,
            status = %saved.status.as_str(),
            total = %saved.total,
            skipped = skipped.len(),
            "Materialized order"
        );

        Ok(OrderSummary {
            id: saved.id,
            status: saved.status,
            order_key: saved.order_key,
            total: saved.total,
            currency: saved.currency,
            skipped,
        })
    }

    /// Resolve one requested line against the catalog
    fn resolve_line(&self, item: &OrderItem) -> Result<Option<OrderLine>, OrderError> {
        let Some(product) = self.catalog.product(target_id(item))? else {
            return Ok(None);
        };

        let quantity = item.quantity.max(1);
        let total = product.price * Decimal::from(quantity);

        Ok(Some(OrderLine {
            product_id: if item.variation_id != 0 {
                // Keep the parent id on the line when ordering a variation
                if item.product_id != 0 {
                    item.product_id
                } else {
                    product.parent_id
                }
            } else {
                item.product_id
            },
            variation_id: item.variation_id,
            name: product.name,
            sku: product.sku,
            quantity,
            price: product.price,
            total,
        }))
    }

    /// Recompute contents, tax and grand total over the resolved lines
    ///
    /// Tax is priced through the engine under a jurisdiction derived from
    /// the billing address; explicit shipping lines replace engine shipping.
    fn recalculate_totals(&self, order: &mut Order) -> Result<(), OrderError> {
        let contents: Decimal = order.line_items.iter().map(|l| l.total).sum();

        let jurisdiction = order
            .billing
            .as_ref()
            .map(|billing| Jurisdiction {
                country: billing.country.clone(),
                state: billing.state.clone(),
                postcode: billing.postcode.clone(),
                city: billing.city.clone(),
            })
            .unwrap_or_default();

        let mut cart = Cart::new(jurisdiction);
        for line in &order.line_items {
            cart.lines.push(CartLine {
                product_id: line.product_id,
                variation_id: line.variation_id,
                quantity: line.quantity,
                attributes: std::collections::HashMap::new(),
            });
        }

        let tax_total = if cart.is_empty() {
            Decimal::ZERO
        } else {
            self.pricing.calculate_totals(&cart)?.tax_total
        };

        let shipping: Decimal = order.shipping_lines.iter().map(|l| l.total).sum();

        order.tax_total = tax_total;
        order.total = contents + tax_total + shipping;
        Ok(())
    }
}

fn target_id(item: &OrderItem) -> u64 {
    if item.variation_id != 0 {
        item.variation_id
    } else {
        item.product_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use commerce_core::{FlatRatePricing, MemoryCatalog, MemoryOrderLedger, Product, ProductType};
    use rust_decimal_macros::dec;

    fn materializer(policy: UnresolvedLinePolicy) -> (OrderMaterializer, Arc<MemoryOrderLedger>) {
        let catalog = MemoryCatalog::new();
        catalog.insert(Product::simple(1, "WIDGET-1", "Widget", dec!(10.00)));
        catalog.insert(Product::simple(2, "GADGET-1", "Gadget", dec!(7.50)));

        let mut tee = Product::simple(10, "TEE-1", "Logo Tee", dec!(25.00));
        tee.product_type = ProductType::Variable;
        tee.variations = vec![11];
        catalog.insert(tee);

        let mut xl = Product::simple(11, "TEE-1-XL", "Logo Tee - XL", dec!(25.00));
        xl.product_type = ProductType::Variation;
        xl.parent_id = 10;
        catalog.insert(xl);

        let catalog = Arc::new(catalog);
        let pricing =
            Arc::new(FlatRatePricing::new(catalog.clone()).with_tax_rate("US", None, dec!(0.08)));
        let ledger = Arc::new(MemoryOrderLedger::new());

        (
            OrderMaterializer::new(catalog, pricing, ledger.clone(), "USD").with_policy(policy),
            ledger,
        )
    }

    fn line(product_id: u64, quantity: u32) -> OrderItem {
        OrderItem {
            product_id,
            variation_id: 0,
            quantity,
        }
    }

    #[test]
    fn test_empty_line_items_rejected_before_persistence() {
        let (materializer, ledger) = materializer(UnresolvedLinePolicy::default());

        let err = materializer.create(CreateOrder::default()).unwrap_err();
        assert!(matches!(err, OrderError::MissingLineItems));
        assert!(ledger.get(1).unwrap().is_none());
    }

    #[test]
    fn test_set_paid_controls_initial_status() {
        let (materializer, _) = materializer(UnresolvedLinePolicy::default());

        let pending = materializer
            .create(CreateOrder {
                line_items: vec![line(1, 1)],
                ..CreateOrder::default()
            })
            .unwrap();
        assert_eq!(pending.status, OrderStatus::Pending);

        let paid = materializer
            .create(CreateOrder {
                line_items: vec![line(1, 1)],
                set_paid: true,
                ..CreateOrder::default()
            })
            .unwrap();
        assert_eq!(paid.status, OrderStatus::Processing);
    }

    #[test]
    fn test_skip_policy_keeps_resolved_lines_and_reports_skips() {
        let (materializer, ledger) = materializer(UnresolvedLinePolicy::SkipUnresolvedLines);

        let summary = materializer
            .create(CreateOrder {
                line_items: vec![line(1, 2), line(999, 1), line(2, 1)],
                ..CreateOrder::default()
            })
            .unwrap();

        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.skipped[0].product_id, 999);
        // Totals cover only the resolved lines: 2*10.00 + 7.50
        assert_eq!(summary.total, dec!(27.50));

        let saved = ledger.get(summary.id).unwrap().unwrap();
        assert_eq!(saved.line_items.len(), 2);
    }

    #[test]
    fn test_fail_policy_aborts_on_unresolved_line() {
        let (materializer, ledger) = materializer(UnresolvedLinePolicy::FailOnUnresolved);

        let err = materializer
            .create(CreateOrder {
                line_items: vec![line(1, 1), line(999, 1)],
                ..CreateOrder::default()
            })
            .unwrap_err();

        assert!(matches!(err, OrderError::UnresolvedLine(999)));
        assert!(ledger.get(1).unwrap().is_none());
    }

    #[test]
    fn test_variation_line_keeps_parent_product_id() {
        let (materializer, ledger) = materializer(UnresolvedLinePolicy::default());

        let summary = materializer
            .create(CreateOrder {
                line_items: vec![OrderItem {
                    product_id: 0,
                    variation_id: 11,
                    quantity: 1,
                }],
                ..CreateOrder::default()
            })
            .unwrap();

        let saved = ledger.get(summary.id).unwrap().unwrap();
        assert_eq!(saved.line_items[0].product_id, 10);
        assert_eq!(saved.line_items[0].variation_id, 11);
        assert_eq!(saved.line_items[0].price, dec!(25.00));
    }

    #[test]
    fn test_totals_include_billing_tax_and_shipping_lines() {
        let (materializer, _) = materializer(UnresolvedLinePolicy::default());

        let summary = materializer
            .create(CreateOrder {
                line_items: vec![line(1, 2)],
                billing: Some(Address {
                    country: "US".into(),
                    ..Address::default()
                }),
                shipping_lines: vec![ShippingLineRequest {
                    total: Some(dec!(5.00)),
                    ..ShippingLineRequest::default()
                }],
                ..CreateOrder::default()
            })
            .unwrap();

        // 20.00 contents + 1.60 tax + 5.00 explicit shipping
        assert_eq!(summary.total, dec!(26.60));
    }

    #[test]
    fn test_shipping_line_defaults_to_flat_rate() {
        let (materializer, ledger) = materializer(UnresolvedLinePolicy::default());

        let summary = materializer
            .create(CreateOrder {
                line_items: vec![line(1, 1)],
                shipping_lines: vec![ShippingLineRequest::default()],
                ..CreateOrder::default()
            })
            .unwrap();

        let saved = ledger.get(summary.id).unwrap().unwrap();
        assert_eq!(saved.shipping_lines[0].method_title, "Flat Rate");
        assert_eq!(saved.shipping_lines[0].method_id, "flat_rate");
        assert_eq!(saved.shipping_lines[0].total, Decimal::ZERO);
    }

    #[test]
    fn test_ledger_failure_surfaces_as_create_error() {
        use commerce_core::StoreError;

        /// Ledger whose persistence always fails
        struct BrokenLedger;

        impl commerce_core::OrderLedger for BrokenLedger {
            fn create(&self, _order: Order) -> commerce_core::Result<Order> {
                Err(StoreError::Storage("ledger unavailable".into()))
            }

            fn get(&self, _id: u64) -> commerce_core::Result<Option<Order>> {
                Ok(None)
            }

            fn update_status(
                &self,
                _id: u64,
                _status: OrderStatus,
            ) -> commerce_core::Result<()> {
                Ok(())
            }
        }

        let catalog = MemoryCatalog::new();
        catalog.insert(Product::simple(1, "WIDGET-1", "Widget", dec!(10.00)));
        let catalog = Arc::new(catalog);
        let pricing = Arc::new(FlatRatePricing::new(catalog.clone()));

        let materializer =
            OrderMaterializer::new(catalog, pricing, Arc::new(BrokenLedger), "USD");

        let err = materializer
            .create(CreateOrder {
                line_items: vec![line(1, 1)],
                ..CreateOrder::default()
            })
            .unwrap_err();

        assert!(matches!(err, OrderError::Create(_)));
        assert_eq!(err.code(), "x402_order_error");
        assert_eq!(err.status(), 500);
    }

    #[test]
    fn test_metadata_attached_to_order() {
        let (materializer, ledger) = materializer(UnresolvedLinePolicy::default());

        let summary = materializer
            .create(CreateOrder {
                line_items: vec![line(1, 1)],
                meta_data: vec![
                    MetaEntry {
                        key: "x402_transaction_id".into(),
                        value: serde_json::json!("0xabc"),
                    },
                    MetaEntry {
                        key: "chain".into(),
                        value: serde_json::json!(8453),
                    },
                ],
                payment_method: Some("x402".into()),
                payment_method_title: Some("Pay with Agent (x402)".into()),
                ..CreateOrder::default()
            })
            .unwrap();

        let saved = ledger.get(summary.id).unwrap().unwrap();
        assert_eq!(saved.meta("x402_transaction_id"), Some(&serde_json::json!("0xabc")));
        assert_eq!(saved.payment_method, "x402");
    }
}
