use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use utoipa::ToSchema;

use crate::environment::Environment;

pub type SessionId = String;
pub type InterpreterName = String;

/// Shared handle to an environment. The mutex serializes evaluations
/// against the same bindings.
pub type EnvironmentHandle = Arc<Mutex<Environment>>;

/// Binds a session id to its environment for one interpreter.
#[derive(Debug)]
pub struct SessionContext {
    session_id: SessionId,
    environment: EnvironmentHandle,
    created_at: DateTime<Utc>,
    last_used_at: DateTime<Utc>,
}

impl SessionContext {
    pub fn new(session_id: impl Into<SessionId>) -> Self {
        let now = Utc::now();
        Self {
            session_id: session_id.into(),
            environment: Arc::new(Mutex::new(Environment::new())),
            created_at: now,
            last_used_at: now,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn environment(&self) -> EnvironmentHandle {
        Arc::clone(&self.environment)
    }

    /// Whether an evaluation (or any other holder) still references the
    /// environment outside the store.
    pub fn in_use(&self) -> bool {
        Arc::strong_count(&self.environment) > 1
    }

    pub(crate) fn touch(&mut self) {
        self.last_used_at = Utc::now();
    }

    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            session_id: self.session_id.clone(),
            created_at: self.created_at,
            last_used_at: self.last_used_at,
        }
    }
}

/// Snapshot of a session's bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub session_id: SessionId,
    pub created_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
}
