//! Demo Store Seeding
//!
//! Seeds the in-memory collaborators with a small catalog so the gateway
//! can be exercised end-to-end without a real storefront behind it.

use std::sync::Arc;

use commerce_core::{
    AttributeDef, FlatRatePricing, MemoryCatalog, Product, ProductType,
};
use rust_decimal::Decimal;

/// Build the demo catalog: two simple products, one stock-limited product
/// and a variable tee with size variations
pub fn demo_catalog() -> Arc<MemoryCatalog> {
    let catalog = MemoryCatalog::new();

    let mut widget = Product::simple(1, "WIDGET-1", "Widget", Decimal::new(1000, 2));
    widget.featured = true;
    catalog.insert(widget);

    catalog.insert(Product::simple(2, "GADGET-1", "Gadget", Decimal::new(750, 2)));

    let mut scarce = Product::simple(3, "SCARCE-1", "Limited Widget", Decimal::new(5000, 2));
    scarce.stock = Some(2);
    catalog.insert(scarce);

    let mut tee = Product::simple(10, "TEE-1", "Logo Tee", Decimal::new(2500, 2));
    tee.product_type = ProductType::Variable;
    tee.featured = true;
    tee.attributes.push(AttributeDef {
        name: "pa_size".into(),
        options: vec!["m".into(), "xl".into()],
    });
    tee.variations = vec![11, 12];
    catalog.insert(tee);

    let mut tee_m = Product::simple(11, "TEE-1-M", "Logo Tee - M", Decimal::new(2500, 2));
    tee_m.product_type = ProductType::Variation;
    tee_m.parent_id = 10;
    tee_m
        .variation_attributes
        .insert("attribute_pa_size".into(), "m".into());
    catalog.insert(tee_m);

    let mut tee_xl = Product::simple(12, "TEE-1-XL", "Logo Tee - XL", Decimal::new(2700, 2));
    tee_xl.product_type = ProductType::Variation;
    tee_xl.parent_id = 10;
    tee_xl
        .variation_attributes
        .insert("attribute_pa_size".into(), "xl".into());
    catalog.insert(tee_xl);

    Arc::new(catalog)
}

/// Pricing engine with a few representative jurisdictions
pub fn demo_pricing(catalog: Arc<MemoryCatalog>) -> Arc<FlatRatePricing> {
    Arc::new(
        FlatRatePricing::new(catalog)
            .with_tax_rate("US", None, Decimal::new(8, 2))
            .with_tax_rate("US", Some("CA"), Decimal::new(725, 4))
            .with_tax_rate("DE", None, Decimal::new(19, 2))
            .with_shipping_rate("DE", Decimal::new(499, 2)),
    )
}
