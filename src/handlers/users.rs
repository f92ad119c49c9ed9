use axum::{
    extract::State,
    http::header::SET_COOKIE,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use crate::auth::{AuthenticatedUser, USER_COOKIE};
use crate::errors::ServiceError;
use crate::services::users::{LoginInput, RegisterInput};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/is-auth", get(is_auth))
        .route("/logout", post(logout))
}

async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let user = state.services.users.register(input).await?;
    let token = state.auth.issue_user_token(user.id)?;
    let cookie = state.auth.session_cookie(USER_COOKIE, &token);
    let body = Json(json!({
        "success": true,
        "user": { "id": user.id, "name": user.name, "email": user.email },
    }));
    Ok(([(SET_COOKIE, cookie)], body))
}

async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let user = state.services.users.login(input).await?;
    let token = state.auth.issue_user_token(user.id)?;
    let cookie = state.auth.session_cookie(USER_COOKIE, &token);
    let body = Json(json!({
        "success": true,
        "user": { "id": user.id, "name": user.name, "email": user.email },
    }));
    Ok(([(SET_COOKIE, cookie)], body))
}

async fn is_auth(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let user = state.services.users.get(auth.user_id).await?;
    Ok(Json(json!({
        "success": true,
        "user": { "id": user.id, "name": user.name, "email": user.email },
    })))
}

async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    let cookie = state.auth.clear_cookie(USER_COOKIE);
    let body = Json(json!({ "success": true, "message": "Logged out" }));
    ([(SET_COOKIE, cookie)], body)
}
