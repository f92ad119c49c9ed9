use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::AuthenticatedUser;
use crate::errors::ServiceError;
use crate::handlers::common::data_response;
use crate::services::addresses::NewAddress;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/add", post(add_address))
        .route("/get", get(list_addresses))
}

#[derive(Debug, Deserialize)]
struct AddAddressBody {
    address: NewAddress,
}

async fn add_address(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<AddAddressBody>,
) -> Result<Json<Value>, ServiceError> {
    let saved = state
        .services
        .addresses
        .add(user.user_id, body.address)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": "Address saved",
        "address": saved,
    })))
}

async fn list_addresses(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Value>, ServiceError> {
    let addresses = state.services.addresses.list(user.user_id).await?;
    Ok(data_response("addresses", addresses))
}
