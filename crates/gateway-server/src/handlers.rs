//! HTTP Handlers
//!
//! Request/response types and handlers for the agent-facing API. Error
//! bodies carry a stable machine-readable `code` alongside the human
//! message.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
};
use chrono::{DateTime, Utc};
use commerce_core::{Address, Jurisdiction, Product, ProductQuery};
use quote_engine::{CartBuilder, CreateOrder, OrderError, QuoteError, QuoteItem, quote};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::auth::{self, AuthError, SECRET_HEADER};
use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub store: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    #[serde(default)]
    pub address: Jurisdiction,
    #[serde(default)]
    pub items: Vec<QuoteItem>,
}

#[derive(Debug, Serialize)]
pub struct ContextResponse {
    pub store_name: String,
    pub currency: String,
    pub units: ContextUnits,
    pub shipping_locations: Vec<String>,
    pub featured_products: Vec<FeaturedProduct>,
    pub policy: ContextPolicy,
}

#[derive(Debug, Serialize)]
pub struct ContextUnits {
    pub weight: String,
    pub dimension: String,
}

#[derive(Debug, Serialize)]
pub struct ContextPolicy {
    pub returns: String,
}

#[derive(Debug, Serialize)]
pub struct FeaturedProduct {
    pub id: u64,
    pub name: String,
    pub sku: String,
    pub price: Decimal,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProductsQuery {
    #[serde(default)]
    pub page: usize,
    #[serde(default)]
    pub per_page: usize,
    pub sku: Option<String>,
    /// Comma-separated product ids
    pub include: Option<String>,
    pub parent: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct ActiveCurrencyResponse {
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct OrderStatusResponse {
    pub id: u64,
    pub status: String,
    pub total: Decimal,
    pub currency: String,
    pub payment_method: String,
    pub date_created: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,
    pub billing: Option<Address>,
    pub shipping: Option<Address>,
    pub line_items: Vec<OrderStatusLine>,
    pub transaction_id: Option<serde_json::Value>,
    pub chain: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct OrderStatusLine {
    pub name: String,
    pub sku: String,
    pub quantity: u32,
    pub total: Decimal,
}

// ============================================================================
// Error Mapping
// ============================================================================

fn error_response(status: u16, code: &str, message: String) -> ApiError {
    (
        StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(ErrorResponse {
            error: message,
            code: code.to_string(),
        }),
    )
}

fn auth_error(err: AuthError) -> ApiError {
    error_response(err.status(), err.code(), err.to_string())
}

fn quote_error(err: QuoteError) -> ApiError {
    error_response(err.status(), err.code(), err.to_string())
}

fn order_error(err: OrderError) -> ApiError {
    error_response(err.status(), err.code(), err.to_string())
}

fn store_error(err: commerce_core::StoreError) -> ApiError {
    error_response(500, "x402_store_error", err.to_string())
}

/// Validate the shared secret on protected endpoints
fn require_secret(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let supplied = headers.get(SECRET_HEADER).and_then(|v| v.to_str().ok());
    auth::verify_secret(state.client_secret.as_deref(), supplied).map_err(auth_error)
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        store: state.settings.name.clone(),
    })
}

/// POST /quote - price a prospective cart
pub async fn get_quote(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<QuoteRequest>,
) -> Result<Json<quote_engine::Quote>, ApiError> {
    require_secret(&state, &headers)?;

    // Fresh cart per request; dropped when this handler returns
    let builder = CartBuilder::new(state.catalog.clone(), state.pricing.clone());
    let cart = builder
        .build(payload.address, &payload.items)
        .map_err(quote_error)?;

    let quote = quote::calculate(
        state.pricing.as_ref(),
        &cart,
        &state.settings.currency,
    )
    .map_err(quote_error)?;

    tracing::info!(
        lines = cart.lines.len(),
        total = %quote.total,
        country = %cart.jurisdiction.country,
        "Computed quote"
    );

    Ok(Json(quote))
}

/// GET /context - public store metadata for agent discovery
pub async fn get_context(State(state): State<AppState>) -> Result<Json<ContextResponse>, ApiError> {
    let featured = state
        .catalog
        .featured(5)
        .map_err(store_error)?
        .into_iter()
        .map(|p| FeaturedProduct {
            id: p.id,
            name: p.name,
            sku: p.sku,
            price: p.price,
            image: p.image,
        })
        .collect();

    let settings = state.settings.as_ref();
    Ok(Json(ContextResponse {
        store_name: settings.name.clone(),
        currency: settings.currency.clone(),
        units: ContextUnits {
            weight: settings.weight_unit.clone(),
            dimension: settings.dimension_unit.clone(),
        },
        shipping_locations: settings.shipping_countries.clone(),
        featured_products: featured,
        policy: ContextPolicy {
            returns: settings.returns_policy.clone(),
        },
    }))
}

/// POST /order - create a persisted order
pub async fn create_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateOrder>,
) -> Result<Json<quote_engine::OrderSummary>, ApiError> {
    require_secret(&state, &headers)?;

    let summary = state.materializer.create(payload).map_err(order_error)?;
    Ok(Json(summary))
}

/// GET /products - paginated catalog listing
pub async fn get_products(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ProductsQuery>,
) -> Result<Json<Vec<Product>>, ApiError> {
    require_secret(&state, &headers)?;

    let include = params
        .include
        .as_deref()
        .map(|raw| {
            raw.split(',')
                .filter_map(|id| id.trim().parse::<u64>().ok())
                .collect()
        })
        .unwrap_or_default();

    let query = ProductQuery {
        page: params.page,
        per_page: params.per_page,
        sku: params.sku,
        include,
        parent: params.parent,
    };

    let products = state.catalog.list(&query).map_err(store_error)?;
    Ok(Json(products))
}

/// GET /active-currency - current store currency code
pub async fn get_active_currency(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ActiveCurrencyResponse>, ApiError> {
    require_secret(&state, &headers)?;

    Ok(Json(ActiveCurrencyResponse {
        value: state.settings.currency.clone(),
    }))
}

/// GET /order/{id} - order status and detail
pub async fn get_order_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(order_id): Path<u64>,
) -> Result<Json<OrderStatusResponse>, ApiError> {
    require_secret(&state, &headers)?;

    let order = state
        .ledger
        .get(order_id)
        .map_err(store_error)?
        .ok_or_else(|| error_response(404, "x402_not_found", "Order not found.".into()))?;

    let line_items = order
        .line_items
        .iter()
        .map(|l| OrderStatusLine {
            name: l.name.clone(),
            sku: l.sku.clone(),
            quantity: l.quantity,
            total: l.total,
        })
        .collect();

    Ok(Json(OrderStatusResponse {
        id: order.id,
        status: order.status.as_str().to_string(),
        total: order.total,
        currency: order.currency.clone(),
        payment_method: order.payment_method_title.clone(),
        date_created: order.created_at,
        date_modified: order.updated_at,
        billing: order.billing.clone(),
        shipping: order.shipping.clone(),
        line_items,
        transaction_id: order.meta("x402_transaction_id").cloned(),
        chain: order.meta("chain").cloned(),
    }))
}
