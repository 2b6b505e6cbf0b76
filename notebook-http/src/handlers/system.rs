use axum::{Json, extract::State, http::StatusCode};

use crate::models::InterpretersResponse;
use crate::server::AppState;

/// Health check endpoint for container health monitoring
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Server is up"))
)]
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// List the interpreter names requests may address
#[utoipa::path(
    get,
    path = "/api/v1/interpreters",
    responses((status = 200, description = "Registered interpreters", body = InterpretersResponse))
)]
#[axum::debug_handler]
pub async fn list_interpreters(State(state): State<AppState>) -> Json<InterpretersResponse> {
    Json(InterpretersResponse {
        interpreters: state.dispatcher.registry().names(),
    })
}
