//! Attribute Matcher
//!
//! Normalizes caller-supplied variant selection attributes into the
//! catalog's canonical key encoding and resolves a concrete variation id.
//!
//! The catalog's variant lookup expects keys in one specific form
//! (`attribute_<slug>` or `attribute_pa_<slug>`, lowercase slug) with
//! case-sensitive values. Callers supply keys with or without either
//! prefix and values in either case, so resolution tries the four
//! prefix/case combinations in a fixed order.

use std::collections::HashMap;

use commerce_core::{CatalogStore, Product, ProductType};

use crate::error::QuoteError;

/// Caller-supplied selection attributes: arbitrary key casing, optional
/// `attribute_` / `attribute_pa_` prefixes, values in either case
pub type SelectionAttributes = HashMap<String, String>;

/// Canonical key prefix for plain (custom) attributes
const PREFIX_PLAIN: &str = "attribute_";

/// Canonical key prefix for taxonomy attributes
const PREFIX_TAXONOMY: &str = "attribute_pa_";

/// Attempt order is a deliberate tie-break: plain attributes before
/// taxonomy-prefixed ones, original case before lowercase. Original-case
/// matches are more likely exact for custom attributes, while taxonomy
/// values are conventionally stored lowercase.
const ATTEMPTS: [(&str, bool); 4] = [
    (PREFIX_PLAIN, false),
    (PREFIX_PLAIN, true),
    (PREFIX_TAXONOMY, false),
    (PREFIX_TAXONOMY, true),
];

/// A line resolved to a concrete purchasable variant
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedVariant {
    pub product_id: u64,

    /// 0 when the product is not variable
    pub variation_id: u64,

    /// The variation's own stored attribute set, re-fetched from the
    /// catalog so a later cart add passes its variant-consistency check
    pub attributes: HashMap<String, String>,
}

/// Reduce a caller key to its bare lowercase slug
fn canonical_slug(key: &str) -> String {
    let lower = key.to_lowercase();
    let stripped = lower.strip_prefix("attribute_").unwrap_or(&lower);
    let stripped = stripped.strip_prefix("pa_").unwrap_or(stripped);
    stripped.to_string()
}

/// Re-encode a selection under one prefix/case combination
pub fn normalize_selection(
    selection: &SelectionAttributes,
    prefix: &str,
    lowercase_values: bool,
) -> HashMap<String, String> {
    selection
        .iter()
        .map(|(key, value)| {
            let value = if lowercase_values {
                value.to_lowercase()
            } else {
                value.clone()
            };
            (format!("{prefix}{}", canonical_slug(key)), value)
        })
        .collect()
}

/// Resolve a product + selection to a concrete variant
///
/// Non-variable products resolve immediately with `variation_id = 0` and
/// no catalog lookup. Variable products require a non-empty selection and
/// are matched through the four normalization attempts; the first
/// combination yielding a variation id wins.
pub fn resolve_variant(
    catalog: &dyn CatalogStore,
    product: &Product,
    selection: &SelectionAttributes,
) -> Result<ResolvedVariant, QuoteError> {
    if product.product_type != ProductType::Variable {
        return Ok(ResolvedVariant {
            product_id: product.id,
            variation_id: 0,
            attributes: HashMap::new(),
        });
    }

    if selection.is_empty() {
        return Err(QuoteError::MissingAttributes(product.sku.clone()));
    }

    for (prefix, lowercase_values) in ATTEMPTS {
        let attributes = normalize_selection(selection, prefix, lowercase_values);

        if let Some(variation_id) = catalog.find_matching_variation(product.id, &attributes)? {
            let attributes = catalog.variation_attributes(variation_id)?;
            tracing::debug!(
                product_id = product.id,
                variation_id,
                prefix,
                lowercase_values,
                "Resolved variation"
            );
            return Ok(ResolvedVariant {
                product_id: product.id,
                variation_id,
                attributes,
            });
        }
    }

    Err(QuoteError::NoVariationMatch(product.sku.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use commerce_core::MemoryCatalog;
    use rust_decimal_macros::dec;

    fn selection(pairs: &[(&str, &str)]) -> SelectionAttributes {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    /// Variable tee whose XL variation is stored as attribute_pa_size=xl
    fn tee_catalog() -> MemoryCatalog {
        let catalog = MemoryCatalog::new();

        let mut tee = Product::simple(10, "TEE-1", "Logo Tee", dec!(25.00));
        tee.product_type = ProductType::Variable;
        tee.variations = vec![11];
        catalog.insert(tee);

        let mut xl = Product::simple(11, "TEE-1-XL", "Logo Tee - XL", dec!(25.00));
        xl.product_type = ProductType::Variation;
        xl.parent_id = 10;
        xl.variation_attributes
            .insert("attribute_pa_size".into(), "xl".into());
        catalog.insert(xl);

        catalog
    }

    #[test]
    fn test_canonical_slug() {
        assert_eq!(canonical_slug("Size"), "size");
        assert_eq!(canonical_slug("pa_size"), "size");
        assert_eq!(canonical_slug("attribute_size"), "size");
        assert_eq!(canonical_slug("attribute_pa_size"), "size");
        assert_eq!(canonical_slug("Attribute_PA_Size"), "size");
    }

    #[test]
    fn test_normalize_selection() {
        let normalized =
            normalize_selection(&selection(&[("Size", "XL")]), PREFIX_TAXONOMY, true);
        assert_eq!(
            normalized.get("attribute_pa_size"),
            Some(&"xl".to_string())
        );

        let original_case =
            normalize_selection(&selection(&[("pa_size", "XL")]), PREFIX_PLAIN, false);
        assert_eq!(original_case.get("attribute_size"), Some(&"XL".to_string()));
    }

    #[test]
    fn test_non_variable_resolves_without_lookup() {
        // Catalog with no variations at all: any lookup would fail
        let catalog = MemoryCatalog::new();
        let product = Product::simple(1, "WIDGET-1", "Widget", dec!(10.00));

        let resolved =
            resolve_variant(&catalog, &product, &selection(&[("Size", "XL")])).unwrap();
        assert_eq!(resolved.variation_id, 0);
        assert!(resolved.attributes.is_empty());
    }

    #[test]
    fn test_variable_with_empty_selection_fails() {
        let catalog = tee_catalog();
        let tee = catalog.product(10).unwrap().unwrap();

        let err = resolve_variant(&catalog, &tee, &SelectionAttributes::new()).unwrap_err();
        assert!(matches!(err, QuoteError::MissingAttributes(_)));
    }

    #[test]
    fn test_all_prefix_case_spellings_resolve() {
        let catalog = tee_catalog();
        let tee = catalog.product(10).unwrap().unwrap();

        for spelling in [
            selection(&[("Size", "XL")]),
            selection(&[("attribute_size", "XL")]),
            selection(&[("pa_size", "xl")]),
            selection(&[("attribute_pa_size", "XL")]),
        ] {
            let resolved = resolve_variant(&catalog, &tee, &spelling).unwrap();
            assert_eq!(resolved.variation_id, 11, "spelling: {spelling:?}");
            assert_eq!(
                resolved.attributes.get("attribute_pa_size"),
                Some(&"xl".to_string())
            );
        }
    }

    #[test]
    fn test_unmatched_attributes_fail() {
        let catalog = tee_catalog();
        let tee = catalog.product(10).unwrap().unwrap();

        let err = resolve_variant(&catalog, &tee, &selection(&[("Size", "XXL")])).unwrap_err();
        assert!(matches!(err, QuoteError::NoVariationMatch(_)));
    }

    #[test]
    fn test_attributes_come_from_catalog_not_caller() {
        let catalog = tee_catalog();
        let tee = catalog.product(10).unwrap().unwrap();

        // Caller spelling differs from storage; resolved attributes must be
        // the stored set
        let resolved = resolve_variant(&catalog, &tee, &selection(&[("SIZE", "XL")])).unwrap();
        assert_eq!(
            resolved.attributes,
            catalog.variation_attributes(11).unwrap()
        );
    }
}
