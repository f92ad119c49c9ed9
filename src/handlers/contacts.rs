use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::AuthenticatedSeller;
use crate::entities::contact::ContactStatus;
use crate::errors::ServiceError;
use crate::handlers::common::{data_response, message_response};
use crate::services::contacts::NewContact;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/submit", post(submit))
        .route("/all", get(list_all))
        .route("/status/:id", post(update_status))
}

async fn submit(
    State(state): State<AppState>,
    Json(input): Json<NewContact>,
) -> Result<Json<Value>, ServiceError> {
    state.services.contacts.submit(input).await?;
    Ok(message_response("Message received"))
}

async fn list_all(
    State(state): State<AppState>,
    _seller: AuthenticatedSeller,
) -> Result<Json<Value>, ServiceError> {
    let messages = state.services.contacts.list().await?;
    Ok(data_response("contacts", messages))
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    status: ContactStatus,
}

async fn update_status(
    State(state): State<AppState>,
    _seller: AuthenticatedSeller,
    Path(id): Path<Uuid>,
    Json(body): Json<StatusBody>,
) -> Result<Json<Value>, ServiceError> {
    let updated = state.services.contacts.update_status(id, body.status).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Status updated",
        "contact": updated,
    })))
}
