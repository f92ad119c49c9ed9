use std::collections::HashMap;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::errors::ServiceError;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/update", post(update_cart))
        .route("/get", get(get_cart))
}

#[derive(Debug, Deserialize)]
struct UpdateCartBody {
    #[serde(rename = "cartItems")]
    cart_items: HashMap<Uuid, i64>,
}

async fn update_cart(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<UpdateCartBody>,
) -> Result<Json<Value>, ServiceError> {
    let saved = state
        .services
        .carts
        .update_cart(user.user_id, body.cart_items)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": "Cart updated",
        "cartItems": saved,
    })))
}

async fn get_cart(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Value>, ServiceError> {
    let view = state.services.carts.get_cart(user.user_id).await?;
    Ok(Json(json!({
        "success": true,
        "cartItems": view.items,
        "cartTotal": view.total,
    })))
}
