//! Catalog Store
//!
//! Read-side contract against the product catalog, plus an in-memory
//! implementation for development and tests.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{Result, StoreError};
use crate::model::{Product, ProductType};

/// Filters for a paginated product listing
#[derive(Clone, Debug, Default)]
pub struct ProductQuery {
    /// 1-based page number (0 treated as 1)
    pub page: usize,

    /// Page size (0 treated as the default of 10)
    pub per_page: usize,

    /// Exact SKU filter
    pub sku: Option<String>,

    /// Restrict to these product ids
    pub include: Vec<u64>,

    /// Restrict to variations of this parent
    pub parent: Option<u64>,
}

impl ProductQuery {
    fn page_or_default(&self) -> usize {
        self.page.max(1)
    }

    fn per_page_or_default(&self) -> usize {
        if self.per_page == 0 { 10 } else { self.per_page }
    }
}

/// Catalog read contract
///
/// Implement this against the real catalog backend; `MemoryCatalog` is the
/// in-memory reference used by tests and the demo server.
pub trait CatalogStore: Send + Sync {
    /// Resolve a SKU to a product id
    fn product_id_by_sku(&self, sku: &str) -> Result<Option<u64>>;

    /// Fetch a product snapshot by id
    fn product(&self, id: u64) -> Result<Option<Product>>;

    /// Find the variation of `product_id` whose stored attributes match the
    /// supplied map
    ///
    /// Keys must already be in canonical `attribute_<slug>` /
    /// `attribute_pa_<slug>` form. A variation matches when every stored
    /// attribute is either equal to the supplied value (case-sensitive) or
    /// stored empty ("any"). The first matching variation in child order
    /// wins.
    fn find_matching_variation(
        &self,
        product_id: u64,
        attributes: &HashMap<String, String>,
    ) -> Result<Option<u64>>;

    /// Fetch the exact stored attribute set of a variation
    fn variation_attributes(&self, variation_id: u64) -> Result<HashMap<String, String>>;

    /// Paginated product listing
    fn list(&self, query: &ProductQuery) -> Result<Vec<Product>>;

    /// Featured products for agent discovery
    fn featured(&self, limit: usize) -> Result<Vec<Product>>;
}

/// In-memory catalog (for development and tests)
pub struct MemoryCatalog {
    products: RwLock<HashMap<u64, Product>>,
    by_sku: RwLock<HashMap<String, u64>>,
}

impl Default for MemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self {
            products: RwLock::new(HashMap::new()),
            by_sku: RwLock::new(HashMap::new()),
        }
    }

    /// Insert or replace a product
    pub fn insert(&self, product: Product) {
        let mut products = self.products.write().unwrap();
        let mut by_sku = self.by_sku.write().unwrap();

        if !product.sku.is_empty() {
            by_sku.insert(product.sku.clone(), product.id);
        }
        products.insert(product.id, product);
    }
}

impl CatalogStore for MemoryCatalog {
    fn product_id_by_sku(&self, sku: &str) -> Result<Option<u64>> {
        let by_sku = self.by_sku.read().unwrap();
        Ok(by_sku.get(sku).copied())
    }

    fn product(&self, id: u64) -> Result<Option<Product>> {
        let products = self.products.read().unwrap();
        Ok(products.get(&id).cloned())
    }

    fn find_matching_variation(
        &self,
        product_id: u64,
        attributes: &HashMap<String, String>,
    ) -> Result<Option<u64>> {
        let products = self.products.read().unwrap();

        let parent = products
            .get(&product_id)
            .ok_or_else(|| StoreError::NotFound(format!("product {product_id}")))?;

        for child_id in &parent.variations {
            let Some(variation) = products.get(child_id) else {
                continue;
            };

            let matches = variation.variation_attributes.iter().all(|(key, stored)| {
                attributes
                    .get(key)
                    .is_some_and(|supplied| stored.is_empty() || supplied == stored)
            });

            if matches && !variation.variation_attributes.is_empty() {
                return Ok(Some(*child_id));
            }
        }

        Ok(None)
    }

    fn variation_attributes(&self, variation_id: u64) -> Result<HashMap<String, String>> {
        let products = self.products.read().unwrap();

        let variation = products
            .get(&variation_id)
            .ok_or_else(|| StoreError::NotFound(format!("variation {variation_id}")))?;

        Ok(variation.variation_attributes.clone())
    }

    fn list(&self, query: &ProductQuery) -> Result<Vec<Product>> {
        let products = self.products.read().unwrap();

        let mut matched: Vec<Product> = products
            .values()
            .filter(|p| match query.parent {
                // Parent filter selects variations of that product
                Some(parent) => p.parent_id == parent,
                None => p.product_type != ProductType::Variation,
            })
            .filter(|p| query.sku.as_ref().is_none_or(|sku| &p.sku == sku))
            .filter(|p| query.include.is_empty() || query.include.contains(&p.id))
            .cloned()
            .collect();

        // Deterministic pagination
        matched.sort_by_key(|p| p.id);

        // Saturating arithmetic: page/per_page are caller-controlled and an
        // out-of-range page is just an empty page, never a panic
        let per_page = query.per_page_or_default();
        let offset = query
            .page_or_default()
            .saturating_sub(1)
            .saturating_mul(per_page);

        Ok(matched.into_iter().skip(offset).take(per_page).collect())
    }

    fn featured(&self, limit: usize) -> Result<Vec<Product>> {
        let products = self.products.read().unwrap();

        let mut featured: Vec<Product> = products
            .values()
            .filter(|p| p.featured && p.product_type != ProductType::Variation)
            .cloned()
            .collect();

        featured.sort_by_key(|p| p.id);
        featured.truncate(limit);
        Ok(featured)
    }
}
