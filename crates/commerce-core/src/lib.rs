//! # commerce-core
//!
//! Storefront domain types and collaborator contracts for the x402 agent
//! gateway.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       quote-engine                           │
//! │  ┌──────────────┐  ┌───────────────┐  ┌──────────────────┐  │
//! │  │ CatalogStore │  │ PricingEngine │  │   OrderLedger    │  │
//! │  │  (products,  │──│ (cart totals, │──│ (create / read / │  │
//! │  │  variations) │  │  tax, ship.)  │  │  update status)  │  │
//! │  └──────────────┘  └───────────────┘  └──────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The three traits model the storefront's existing subsystems; each ships
//! with an in-memory implementation (`MemoryCatalog`, `FlatRatePricing`,
//! `MemoryOrderLedger`) used by tests and the demo server. All monetary
//! values are `rust_decimal::Decimal`.

pub mod catalog;
pub mod error;
pub mod ledger;
pub mod model;
pub mod pricing;

pub use catalog::{CatalogStore, MemoryCatalog, ProductQuery};
pub use error::{Result, StoreError};
pub use ledger::{MemoryOrderLedger, OrderLedger};
pub use model::{
    Address, AttributeDef, Jurisdiction, MetaEntry, Order, OrderLine, OrderStatus, Product,
    ProductType, ShippingLine, StoreSettings,
};
pub use pricing::{Cart, CartLine, CartTotals, FlatRatePricing, PricingEngine};
