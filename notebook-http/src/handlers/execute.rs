use axum::{Json, extract::State};
use notebook::{ExecutionRequest, ResultResponse};

use crate::server::AppState;

/// Evaluate one `%interpreter code` line
///
/// Always answers 200; parse, lookup and evaluation failures are reported in
/// the `error` field of the body.
#[utoipa::path(
    post,
    path = "/execute",
    request_body = ExecutionRequest,
    responses(
        (status = 200, description = "Evaluation outcome", body = ResultResponse),
        (status = 422, description = "Body is not a valid execution request")
    )
)]
#[axum::debug_handler]
pub async fn execute(
    State(state): State<AppState>,
    Json(request): Json<ExecutionRequest>,
) -> Json<ResultResponse> {
    Json(state.dispatcher.handle(request).await)
}
