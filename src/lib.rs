pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod payments;
pub mod services;

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};

use crate::auth::AuthService;
use crate::config::AppConfig;
use crate::events::EventSender;
use crate::handlers::AppServices;

/// Shared state cloned into every request handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: AppConfig,
    pub auth: Arc<AuthService>,
    pub services: AppServices,
    pub event_sender: EventSender,
}

/// Builds the full API router. Callers layer CORS, tracing, and other
/// middleware on top.
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "herbcart api is running" }))
        .route("/api/health", get(health_check))
        .nest("/api/user", handlers::users::routes())
        .nest("/api/seller", handlers::sellers::routes())
        .nest("/api/product", handlers::products::routes())
        .nest("/api/cart", handlers::carts::routes())
        .nest("/api/address", handlers::addresses::routes())
        .nest("/api/order", handlers::orders::routes())
        .nest("/api/contact", handlers::contacts::routes())
        .nest("/api/analytics", handlers::analytics::routes())
        .with_state(state)
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let database = match db::check_connection(&state.db).await {
        Ok(()) => "up",
        Err(_) => "down",
    };
    Json(json!({
        "status": if database == "up" { "ok" } else { "degraded" },
        "database": database,
        "features": {
            "onlinePayments": state.config.razorpay_key_id.is_some()
                && state.config.razorpay_key_secret.is_some(),
            "sellerLogin": state.config.seller_email.is_some()
                && state.config.seller_password.is_some(),
            "email": state.config.sendgrid_api_key.is_some(),
            "whatsapp": state.config.whatsapp_token.is_some(),
        },
    }))
}
