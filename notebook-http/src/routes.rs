use axum::{
    Router,
    routing::{delete, get, post},
};
use notebook::context::SessionInfo;
use notebook::{ExecutionRequest, ResultResponse};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers::{execute, sessions, system};
use crate::models::{InterpretersResponse, SessionsResponse};
use crate::server::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        execute::execute,
        system::health_check,
        system::list_interpreters,
        sessions::list_sessions,
        sessions::delete_session
    ),
    components(schemas(
        ExecutionRequest,
        ResultResponse,
        InterpretersResponse,
        SessionsResponse,
        SessionInfo
    ))
)]
pub struct ApiDoc;

/// Create the main API router with state
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(system::health_check))
        .route("/execute", post(execute::execute))
        .nest("/api/v1", api_v1_router())
}

fn api_v1_router() -> Router<AppState> {
    Router::new()
        .route("/interpreters", get(system::list_interpreters))
        .route("/sessions/{interpreter}", get(sessions::list_sessions))
        .route(
            "/sessions/{interpreter}/{session_id}",
            delete(sessions::delete_session),
        )
}
