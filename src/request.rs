use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A code submission, e.g. `{"code": "%python print a", "sessionId": "1"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRequest {
    /// `%<interpreter> <code>` line
    pub code: String,
    /// Scopes environment reuse; absent or empty uses the shared environment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl ExecutionRequest {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            session_id: None,
        }
    }

    pub fn with_session(code: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            session_id: Some(session_id.into()),
        }
    }

    /// The session id, treating an empty id as absent.
    pub fn session(&self) -> Option<&str> {
        self.session_id.as_deref().filter(|id| !id.is_empty())
    }
}
