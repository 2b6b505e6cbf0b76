use std::{fs::File, io::BufReader, path::Path, sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::context::{EvictionPolicy, IdleEviction, Unbounded};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to open config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Which response field carries the unknown-interpreter message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPlacement {
    /// Every failure is reported in `error`.
    #[default]
    Normalized,
    /// The unknown-interpreter message is reported in `result`, as older
    /// clients expect. Parse errors and evaluation faults still use `error`.
    Legacy,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NotebookConfig {
    #[serde(default)]
    pub error_placement: ErrorPlacement,

    /// Sessions idle for longer than this are evicted. Unset keeps every
    /// session for the lifetime of the process.
    #[serde(default, with = "option_duration_ms")]
    #[schema(value_type = Option<u64>, pattern = "uint64 as milliseconds")]
    pub session_idle_timeout: Option<Duration>,

    #[serde(default = "default_eviction_interval", with = "duration_ms")]
    #[schema(value_type = u64, pattern = "uint64 as milliseconds")]
    pub eviction_interval: Duration,

    /// Upper bound on how long a caller waits for an evaluation. Unset waits
    /// indefinitely.
    #[serde(default, with = "option_duration_ms")]
    #[schema(value_type = Option<u64>, pattern = "uint64 as milliseconds")]
    pub evaluation_timeout: Option<Duration>,

    /// Built-in engine names that are not registered.
    #[serde(default)]
    pub disabled_engines: Vec<String>,
}

impl Default for NotebookConfig {
    fn default() -> Self {
        Self {
            error_placement: ErrorPlacement::default(),
            session_idle_timeout: None,
            eviction_interval: default_eviction_interval(),
            evaluation_timeout: None,
            disabled_engines: Vec::new(),
        }
    }
}

impl NotebookConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_str(s: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn eviction_policy(&self) -> Arc<dyn EvictionPolicy> {
        match self.session_idle_timeout {
            Some(max_idle) => Arc::new(IdleEviction::new(max_idle)),
            None => Arc::new(Unbounded),
        }
    }
}

fn default_eviction_interval() -> Duration {
    Duration::from_secs(60)
}

// durations travel as integer milliseconds
pub mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

pub mod option_duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(duration) => serializer.serialize_some(&(duration.as_millis() as u64)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = Option::<u64>::deserialize(deserializer)?;
        Ok(millis.map(Duration::from_millis))
    }
}
