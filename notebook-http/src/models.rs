use notebook::context::SessionInfo;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct InterpretersResponse {
    /// Registered interpreter names, sorted
    pub interpreters: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionsResponse {
    pub interpreter: String,
    /// Live sessions for `interpreter`, oldest first
    pub sessions: Vec<SessionInfo>,
}
