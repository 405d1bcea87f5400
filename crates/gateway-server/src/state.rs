//! Application State

use std::sync::Arc;

use commerce_core::{CatalogStore, OrderLedger, PricingEngine, StoreSettings};
use quote_engine::OrderMaterializer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Product catalog
    pub catalog: Arc<dyn CatalogStore>,

    /// Pricing/tax engine
    pub pricing: Arc<dyn PricingEngine>,

    /// Order persistence
    pub ledger: Arc<dyn OrderLedger>,

    /// Order creation pipeline (stateless, shared across requests)
    pub materializer: Arc<OrderMaterializer>,

    /// Store-level settings (name, currency, units, shipping countries)
    pub settings: Arc<StoreSettings>,

    /// Shared secret for protected endpoints (None if not configured)
    pub client_secret: Option<String>,
}
