//! Outbound results

use std::path::PathBuf;

use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{BridgeError, ErrorCode};

/// How a print request was settled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrintOutcome {
    /// The spooler accepted the whole job
    Delivered { device_used: String },
    /// The job was saved to disk instead
    Deferred { fallback_path: PathBuf },
}

impl PrintOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }
}

impl Serialize for PrintOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("PrintOutcome", 2)?;
        match self {
            Self::Delivered { device_used } => {
                state.serialize_field("printed", &true)?;
                state.serialize_field("printer", device_used)?;
            }
            Self::Deferred { fallback_path } => {
                state.serialize_field("printed", &false)?;
                state.serialize_field("path", &fallback_path.to_string_lossy())?;
            }
        }
        state.end()
    }
}

/// Reply to a [`MethodCall`](crate::request::MethodCall)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MethodResponse {
    Success {
        result: Value,
    },
    Error {
        code: ErrorCode,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        details: Option<Value>,
    },
    NotImplemented,
}

impl MethodResponse {
    pub fn success(result: Value) -> Self {
        Self::Success { result }
    }

    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Error {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Wire code of an error response
    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            Self::Error { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<BridgeError> for MethodResponse {
    fn from(err: BridgeError) -> Self {
        match err.code() {
            Some(code) => Self::Error {
                code,
                details: err.details(),
                message: err.to_string(),
            },
            None => Self::NotImplemented,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_outcome_wire_form() {
        let delivered = PrintOutcome::Delivered {
            device_used: "TTP244".into(),
        };
        assert_eq!(
            serde_json::to_value(&delivered).unwrap(),
            json!({ "printed": true, "printer": "TTP244" })
        );

        let deferred = PrintOutcome::Deferred {
            fallback_path: PathBuf::from("/tmp/ttp244_1.tspl"),
        };
        assert_eq!(
            serde_json::to_value(&deferred).unwrap(),
            json!({ "printed": false, "path": "/tmp/ttp244_1.tspl" })
        );
    }

    #[test]
    fn test_response_wire_form() {
        assert_eq!(
            serde_json::to_value(MethodResponse::success(json!({ "printed": true }))).unwrap(),
            json!({ "status": "success", "result": { "printed": true } })
        );
        assert_eq!(
            serde_json::to_value(MethodResponse::NotImplemented).unwrap(),
            json!({ "status": "not_implemented" })
        );
        assert_eq!(
            serde_json::to_value(MethodResponse::error(ErrorCode::PrintError, "disk full")).unwrap(),
            json!({ "status": "error", "code": "PRINT_ERROR", "message": "disk full" })
        );
    }

    #[test]
    fn test_from_bridge_error() {
        let resp = MethodResponse::from(BridgeError::MissingArgument("commands".into()));
        assert_eq!(
            resp,
            MethodResponse::Error {
                code: ErrorCode::ArgError,
                message: "Missing 'commands' argument".into(),
                details: Some(json!({ "field": "commands" })),
            }
        );

        let resp = MethodResponse::from(BridgeError::UnsupportedOperation("scan".into()));
        assert_eq!(resp, MethodResponse::NotImplemented);
    }
}
