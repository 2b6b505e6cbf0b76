//! Policies deciding when a session environment may be dropped.
//!
//! Session environments are otherwise kept for the lifetime of the store.
//! [`Unbounded`] keeps that behavior, so memory grows with the number of
//! distinct sessions ever seen.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};

use super::session::SessionInfo;

pub trait EvictionPolicy: Send + Sync + fmt::Debug {
    fn should_evict(&self, session: &SessionInfo, now: DateTime<Utc>) -> bool;
}

/// Never evicts.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unbounded;

impl EvictionPolicy for Unbounded {
    fn should_evict(&self, _session: &SessionInfo, _now: DateTime<Utc>) -> bool {
        false
    }
}

/// Evicts sessions that have not been used for longer than `max_idle`.
#[derive(Debug, Clone, Copy)]
pub struct IdleEviction {
    pub max_idle: Duration,
}

impl IdleEviction {
    pub fn new(max_idle: Duration) -> Self {
        Self { max_idle }
    }
}

impl EvictionPolicy for IdleEviction {
    fn should_evict(&self, session: &SessionInfo, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(session.last_used_at)
            .to_std()
            .map(|idle| idle > self.max_idle)
            .unwrap_or(false)
    }
}
