use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::ErrorPlacement;
use crate::error::{DispatchError, DispatchResult};

/// Uniform response envelope. At most one field is present; absent fields
/// are omitted from the JSON rather than written as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ResultResponse {
    /// Captured output, trimmed. `""` when the code printed nothing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    /// Failure message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResultResponse {
    pub fn ok(result: impl Into<String>) -> Self {
        Self {
            result: Some(result.into()),
            error: None,
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        Self {
            result: None,
            error: Some(error.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Builds the envelope for a dispatch outcome.
    pub fn from_outcome(outcome: DispatchResult<String>, placement: ErrorPlacement) -> Self {
        match outcome {
            Ok(output) => Self::ok(output.trim()),
            Err(err) => Self::from_error(&err, placement),
        }
    }

    pub fn from_error(err: &DispatchError, placement: ErrorPlacement) -> Self {
        match (err, placement) {
            (DispatchError::UnknownInterpreter(_), ErrorPlacement::Legacy) => {
                Self::ok(err.to_string())
            }
            _ => Self::error(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EvaluationFault;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_absent_fields_are_omitted() {
        assert_eq!(
            serde_json::to_string(&ResultResponse::ok("5")).unwrap(),
            r#"{"result":"5"}"#
        );
        assert_eq!(
            serde_json::to_string(&ResultResponse::error("boom")).unwrap(),
            r#"{"error":"boom"}"#
        );
    }

    #[test]
    fn test_empty_result_is_kept() {
        assert_eq!(
            serde_json::to_string(&ResultResponse::ok("")).unwrap(),
            r#"{"result":""}"#
        );
    }

    #[test]
    fn test_output_is_trimmed() {
        let response =
            ResultResponse::from_outcome(Ok("  5\n".to_string()), ErrorPlacement::Normalized);
        assert_eq!(response, ResultResponse::ok("5"));
    }

    #[test]
    fn test_error_placement() {
        let unknown = DispatchError::UnknownInterpreter("abc".to_string());
        assert_eq!(
            ResultResponse::from_error(&unknown, ErrorPlacement::Normalized),
            ResultResponse::error("Unknown 'abc' as interpreter")
        );
        assert_eq!(
            ResultResponse::from_error(&unknown, ErrorPlacement::Legacy),
            ResultResponse::ok("Unknown 'abc' as interpreter")
        );

        // only the unknown-interpreter message moves
        let fault = DispatchError::from(EvaluationFault::new("NameError: x"));
        assert_eq!(
            ResultResponse::from_error(&fault, ErrorPlacement::Legacy),
            ResultResponse::error("NameError: x")
        );
        assert_eq!(
            ResultResponse::from_error(&DispatchError::Parse, ErrorPlacement::Legacy),
            ResultResponse::error("Requested code cannot be parsed")
        );
    }
}
