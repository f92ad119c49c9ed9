use axum::{extract::State, routing::get, Json, Router};
use serde_json::Value;

use crate::auth::AuthenticatedSeller;
use crate::errors::ServiceError;
use crate::handlers::common::data_response;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/seller", get(seller_analytics))
}

async fn seller_analytics(
    State(state): State<AppState>,
    _seller: AuthenticatedSeller,
) -> Result<Json<Value>, ServiceError> {
    let analytics = state.services.analytics.seller_analytics().await?;
    Ok(data_response("analytics", analytics))
}
