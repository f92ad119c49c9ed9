use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::AuthenticatedSeller;
use crate::errors::ServiceError;
use crate::handlers::common::data_response;
use crate::services::products::NewProduct;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/list", get(list_products))
        .route("/add", post(add_product))
        .route("/id", post(get_product))
        .route("/stock", post(set_stock))
}

async fn list_products(State(state): State<AppState>) -> Result<Json<Value>, ServiceError> {
    let products = state.services.products.list().await?;
    Ok(data_response("products", products))
}

async fn add_product(
    State(state): State<AppState>,
    _seller: AuthenticatedSeller,
    Json(input): Json<NewProduct>,
) -> Result<Json<Value>, ServiceError> {
    let product = state.services.products.create(input).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Product added",
        "product": product,
    })))
}

#[derive(Debug, Deserialize)]
struct ProductIdBody {
    id: Uuid,
}

async fn get_product(
    State(state): State<AppState>,
    Json(body): Json<ProductIdBody>,
) -> Result<Json<Value>, ServiceError> {
    let product = state.services.products.get(body.id).await?;
    Ok(data_response("product", product))
}

#[derive(Debug, Deserialize)]
struct StockBody {
    id: Uuid,
    #[serde(rename = "inStock")]
    in_stock: bool,
}

async fn set_stock(
    State(state): State<AppState>,
    _seller: AuthenticatedSeller,
    Json(body): Json<StockBody>,
) -> Result<Json<Value>, ServiceError> {
    let product = state.services.products.set_stock(body.id, body.in_stock).await?;
    Ok(data_response("product", product))
}
