use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::info;

use crate::error::AppError;
use crate::models::SessionsResponse;
use crate::server::AppState;

/// List live sessions of an interpreter
#[utoipa::path(
    get,
    path = "/api/v1/sessions/{interpreter}",
    params(("interpreter" = String, Path, description = "Interpreter name")),
    responses(
        (status = 200, description = "Sessions listed", body = SessionsResponse),
        (status = 404, description = "Interpreter not registered")
    )
)]
#[axum::debug_handler]
pub async fn list_sessions(
    State(state): State<AppState>,
    Path(interpreter): Path<String>,
) -> Result<Json<SessionsResponse>, AppError> {
    if !state.dispatcher.registry().contains(&interpreter) {
        return Err(AppError::UnknownInterpreter(interpreter));
    }
    let sessions = state.dispatcher.store().sessions(&interpreter);
    Ok(Json(SessionsResponse {
        interpreter,
        sessions,
    }))
}

/// Drop a session and its environment
///
/// A later request under the same id starts from an empty environment.
#[utoipa::path(
    delete,
    path = "/api/v1/sessions/{interpreter}/{session_id}",
    params(
        ("interpreter" = String, Path, description = "Interpreter name"),
        ("session_id" = String, Path, description = "Session id")
    ),
    responses(
        (status = 204, description = "Session removed"),
        (status = 404, description = "No such session")
    )
)]
#[axum::debug_handler]
pub async fn delete_session(
    State(state): State<AppState>,
    Path((interpreter, session_id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    if state.dispatcher.store().remove(&interpreter, &session_id) {
        info!(%interpreter, %session_id, "Session removed");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::SessionNotFound {
            interpreter,
            session_id,
        })
    }
}
