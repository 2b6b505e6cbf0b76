use thiserror::Error;

use crate::engine::EvaluationFault;

/// Failure kinds of a single dispatch.
///
/// The `Display` output of each variant is the exact message delivered to
/// clients in the response envelope.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DispatchError {
    #[error("Requested code cannot be parsed")]
    Parse,

    #[error("Unknown '{0}' as interpreter")]
    UnknownInterpreter(String),

    #[error("{0}")]
    Evaluation(#[from] EvaluationFault),

    #[error("Evaluation timed out after {0}ms")]
    Timeout(u128),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type DispatchResult<T> = Result<T, DispatchError>;

impl DispatchError {
    pub fn internal<S: Into<String>>(message: S) -> Self {
        DispatchError::Internal(message.into())
    }
}
