//! # quote-engine
//!
//! The quote and ordering core of the x402 agent gateway: given a target
//! jurisdiction and a set of SKUs / variant attributes / quantities, resolve
//! each line to a concrete purchasable variant, build an ephemeral pricing
//! cart, and compute an authoritative total matching storefront checkout.
//!
//! ## Pipeline
//!
//! ```text
//! request ──▶ Attribute Matcher ──▶ Cart Builder ──▶ Quote Calculator
//!   │          (per variable line)   (fresh cart,       (total = sum of
//!   │                                 fail-fast)         raw components)
//!   └────────▶ Order Materializer (separate path, ids already known)
//! ```
//!
//! Every cart is constructed, used and discarded within one request; nothing
//! is pooled or shared across calls.

pub mod cart;
pub mod error;
pub mod matcher;
pub mod order;
pub mod quote;

pub use cart::{CartBuilder, QuoteItem};
pub use error::{OrderError, QuoteError};
pub use matcher::{ResolvedVariant, SelectionAttributes, normalize_selection, resolve_variant};
pub use order::{
    CreateOrder, OrderItem, OrderMaterializer, OrderSummary, ShippingLineRequest, SkippedLine,
    UnresolvedLinePolicy,
};
pub use quote::{Quote, calculate};
