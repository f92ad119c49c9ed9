use axum::{
    extract::State,
    http::header::SET_COOKIE,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::auth::{AuthenticatedSeller, SELLER_COOKIE};
use crate::errors::ServiceError;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/is-auth", get(is_auth))
        .route("/logout", post(logout))
}

#[derive(Debug, Deserialize)]
struct SellerLoginBody {
    email: String,
    password: String,
}

/// The seller account is a single credential pair from configuration,
/// not a database row.
async fn login(
    State(state): State<AppState>,
    Json(body): Json<SellerLoginBody>,
) -> Result<impl IntoResponse, ServiceError> {
    let (Some(expected_email), Some(expected_password)) = (
        state.config.seller_email.as_deref(),
        state.config.seller_password.as_deref(),
    ) else {
        return Err(ServiceError::InvalidOperation(
            "Seller login is not configured".to_string(),
        ));
    };

    if !body.email.trim().eq_ignore_ascii_case(expected_email)
        || body.password != expected_password
    {
        warn!(email = %body.email, "seller login rejected");
        return Err(ServiceError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    let token = state.auth.issue_seller_token(expected_email)?;
    let cookie = state.auth.session_cookie(SELLER_COOKIE, &token);
    let body = Json(json!({ "success": true, "message": "Logged in" }));
    Ok(([(SET_COOKIE, cookie)], body))
}

async fn is_auth(seller: AuthenticatedSeller) -> Json<serde_json::Value> {
    Json(json!({ "success": true, "email": seller.email }))
}

async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    let cookie = state.auth.clear_cookie(SELLER_COOKIE);
    let body = Json(json!({ "success": true, "message": "Logged out" }));
    ([(SET_COOKIE, cookie)], body)
}
