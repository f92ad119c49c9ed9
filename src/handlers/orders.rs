use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::{AuthenticatedSeller, AuthenticatedUser};
use crate::entities::order::OrderStatus;
use crate::errors::ServiceError;
use crate::handlers::common::data_response;
use crate::services::orders::{OrderItemInput, VerifyPaymentInput};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cod", post(place_cod_order))
        .route("/razorpay", post(create_razorpay_order))
        .route("/razorpay/verify", post(verify_razorpay_payment))
        .route("/user", get(list_user_orders))
        .route("/seller", get(list_all_orders))
        .route("/status", post(update_order_status))
}

#[derive(Debug, Deserialize)]
struct PlaceOrderBody {
    #[serde(rename = "addressId")]
    address_id: Uuid,
    items: Vec<OrderItemInput>,
}

async fn place_cod_order(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<PlaceOrderBody>,
) -> Result<Json<Value>, ServiceError> {
    let order = state
        .services
        .orders
        .place_cod_order(user.user_id, body.address_id, body.items)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": "Order placed",
        "orderId": order.id,
    })))
}

async fn create_razorpay_order(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<PlaceOrderBody>,
) -> Result<Json<Value>, ServiceError> {
    let intent = state
        .services
        .orders
        .create_razorpay_intent(user.user_id, body.address_id, body.items)
        .await?;
    Ok(Json(json!({
        "success": true,
        "orderId": intent.order_id,
        "amount": intent.amount,
        "amountPaise": intent.amount_paise,
        "currency": intent.currency,
        "keyId": intent.key_id,
    })))
}

async fn verify_razorpay_payment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<VerifyPaymentInput>,
) -> Result<Json<Value>, ServiceError> {
    let order = state
        .services
        .orders
        .verify_and_confirm(user.user_id, body)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": "Payment verified",
        "orderId": order.id,
        "paymentId": order.payment_transaction_id,
    })))
}

async fn list_user_orders(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Value>, ServiceError> {
    let orders = state.services.orders.list_user_orders(user.user_id).await?;
    Ok(data_response("orders", orders))
}

async fn list_all_orders(
    State(state): State<AppState>,
    _seller: AuthenticatedSeller,
) -> Result<Json<Value>, ServiceError> {
    let orders = state.services.orders.list_all_orders().await?;
    Ok(data_response("orders", orders))
}

#[derive(Debug, Deserialize)]
struct UpdateStatusBody {
    #[serde(rename = "orderId")]
    order_id: Uuid,
    status: OrderStatus,
}

async fn update_order_status(
    State(state): State<AppState>,
    _seller: AuthenticatedSeller,
    Json(body): Json<UpdateStatusBody>,
) -> Result<Json<Value>, ServiceError> {
    let order = state
        .services
        .orders
        .update_status(body.order_id, body.status)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": "Order status updated",
        "order": order,
    })))
}
