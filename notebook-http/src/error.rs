//! Errors returned by the management endpoints.
//!
//! `POST /execute` never fails at the HTTP level; evaluation failures are
//! carried inside its `ResultResponse` body.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unknown '{0}' as interpreter")]
    UnknownInterpreter(String),

    #[error("Session '{session_id}' not found for interpreter '{interpreter}'")]
    SessionNotFound {
        interpreter: String,
        session_id: String,
    },
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::UnknownInterpreter(_) | Self::SessionNotFound { .. } => StatusCode::NOT_FOUND,
        }
    }
}

impl PartialEq<StatusCode> for AppError {
    fn eq(&self, status_code: &StatusCode) -> bool {
        &self.status_code() == status_code
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.to_string(),
        }));

        (self.status_code(), body).into_response()
    }
}
