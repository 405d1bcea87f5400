//! x402 Storefront Gateway Server
//!
//! Axum-based server exposing the agent-facing payment and ordering API:
//! quotes, store context, order creation and order status, authenticated
//! with a shared client secret.

mod auth;
mod demo;
mod handlers;
mod state;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commerce_core::{MemoryOrderLedger, StoreSettings};
use quote_engine::OrderMaterializer;

use crate::handlers::{
    create_order, get_active_currency, get_context, get_order_status, get_products, get_quote,
    health_check,
};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    // Store settings
    let mut settings = StoreSettings::default();
    if let Ok(name) = std::env::var("STORE_NAME") {
        settings.name = name;
    }
    if let Ok(currency) = std::env::var("STORE_CURRENCY") {
        settings.currency = currency;
    }
    settings.shipping_countries = vec!["US".into(), "DE".into(), "GB".into()];
    let settings = Arc::new(settings);

    // Shared secret for protected endpoints
    let client_secret = std::env::var("X402_CLIENT_SECRET").ok().filter(|s| !s.is_empty());
    if client_secret.is_some() {
        tracing::info!("✓ Client secret configured");
    } else {
        tracing::warn!("⚠ X402_CLIENT_SECRET not set - protected endpoints will return 500");
        tracing::warn!("  Set X402_CLIENT_SECRET in .env");
    }

    // Wire collaborators (in-memory demo store)
    let catalog = demo::demo_catalog();
    let pricing = demo::demo_pricing(catalog.clone());
    let ledger = Arc::new(MemoryOrderLedger::new());

    let materializer = Arc::new(OrderMaterializer::new(
        catalog.clone(),
        pricing.clone(),
        ledger.clone(),
        settings.currency.clone(),
    ));

    // Build application state
    let state = AppState {
        catalog,
        pricing,
        ledger,
        materializer,
        settings: settings.clone(),
        client_secret,
    };

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = Router::new()
        // Health & discovery
        .route("/health", get(health_check))
        .route("/context", get(get_context))
        // Quote & ordering
        .route("/quote", post(get_quote))
        .route("/order", post(create_order))
        .route("/order/{id}", get(get_order_status))
        // Catalog
        .route("/products", get(get_products))
        .route("/active-currency", get(get_active_currency))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 {} gateway running on http://{}", settings.name, addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health           - Health check");
    tracing::info!("  GET  /context          - Store metadata (public)");
    tracing::info!("  POST /quote            - Price a prospective cart");
    tracing::info!("  POST /order            - Create an order");
    tracing::info!("  GET  /order/{{id}}       - Order status/detail");
    tracing::info!("  GET  /products         - Catalog listing");
    tracing::info!("  GET  /active-currency  - Active currency code");
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}
