//! # Context Store
//!
//! Maps (interpreter name, session id) to a persistent [`Environment`].
//!
//! * A request without a session id (or with an empty one) always gets the
//!   single shared anonymous environment, whatever interpreter it names.
//!   Sessionless bindings are therefore visible across interpreters.
//! * A request with a session id gets the environment stored under that id
//!   for that interpreter, created on first use. Session ids are scoped per
//!   interpreter: `("python", "1")` and `("jython", "1")` never share state.
//!
//! Lookup and creation happen under the write lock of the interpreter's
//! entry, so concurrent first requests for the same key observe one
//! environment.

pub mod eviction;
pub mod session;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::debug;

use crate::environment::Environment;
pub use eviction::{EvictionPolicy, IdleEviction, Unbounded};
pub use session::{EnvironmentHandle, InterpreterName, SessionContext, SessionId, SessionInfo};

#[derive(Debug)]
pub struct ContextStore {
    shared: EnvironmentHandle,
    interpreters: DashMap<InterpreterName, Vec<SessionContext>>,
    eviction_policy: Arc<dyn EvictionPolicy>,
}

impl Default for ContextStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextStore {
    /// A store that never evicts session environments.
    pub fn new() -> Self {
        Self::with_eviction_policy(Arc::new(Unbounded))
    }

    pub fn with_eviction_policy(eviction_policy: Arc<dyn EvictionPolicy>) -> Self {
        Self {
            shared: Arc::new(Mutex::new(Environment::new())),
            interpreters: DashMap::new(),
            eviction_policy,
        }
    }

    /// Returns the environment for `interpreter` and `session_id`, creating
    /// it if this is the first request for the pair.
    pub fn get_environment(&self, interpreter: &str, session_id: Option<&str>) -> EnvironmentHandle {
        let Some(session_id) = session_id.filter(|id| !id.is_empty()) else {
            return self.shared_environment();
        };

        let mut contexts = self.interpreters.entry(interpreter.to_string()).or_default();
        if let Some(context) = contexts
            .iter_mut()
            .find(|context| context.session_id() == session_id)
        {
            context.touch();
            return context.environment();
        }

        debug!(
            "Creating context for session '{}' of interpreter '{}'",
            session_id, interpreter
        );
        let context = SessionContext::new(session_id);
        let environment = context.environment();
        contexts.push(context);
        environment
    }

    /// The environment used by every sessionless request.
    pub fn shared_environment(&self) -> EnvironmentHandle {
        Arc::clone(&self.shared)
    }

    /// Sessions stored for `interpreter`, in creation order.
    pub fn sessions(&self, interpreter: &str) -> Vec<SessionInfo> {
        self.interpreters
            .get(interpreter)
            .map(|contexts| contexts.iter().map(SessionContext::info).collect())
            .unwrap_or_default()
    }

    /// Interpreters that hold at least one session, in lexical order.
    pub fn interpreters(&self) -> Vec<InterpreterName> {
        let mut names: Vec<InterpreterName> = self
            .interpreters
            .iter()
            .filter(|entry| !entry.value().is_empty())
            .map(|entry| entry.key().clone())
            .collect();
        names.sort_unstable();
        names
    }

    pub fn session_count(&self) -> usize {
        self.interpreters.iter().map(|entry| entry.value().len()).sum()
    }

    /// Drops a session's environment. The next request for the pair starts
    /// from empty bindings.
    pub fn remove(&self, interpreter: &str, session_id: &str) -> bool {
        let Some(mut contexts) = self.interpreters.get_mut(interpreter) else {
            return false;
        };
        let before = contexts.len();
        contexts.retain(|context| context.session_id() != session_id);
        let removed = contexts.len() != before;
        if removed {
            debug!(
                "Removed session '{}' of interpreter '{}'",
                session_id, interpreter
            );
        }
        removed
    }

    /// Runs the eviction policy over every stored session. The shared
    /// anonymous environment and sessions with an evaluation in flight are
    /// never evicted. Returns the number of sessions dropped.
    pub fn evict_expired(&self) -> usize {
        self.evict_expired_at(Utc::now())
    }

    pub fn evict_expired_at(&self, now: DateTime<Utc>) -> usize {
        let mut evicted = 0;
        self.interpreters.retain(|interpreter, contexts| {
            contexts.retain(|context| {
                let expired =
                    !context.in_use() && self.eviction_policy.should_evict(&context.info(), now);
                if expired {
                    debug!(
                        "Evicting session '{}' of interpreter '{}'",
                        context.session_id(),
                        interpreter
                    );
                    evicted += 1;
                }
                !expired
            });
            !contexts.is_empty()
        });
        evicted
    }
}
