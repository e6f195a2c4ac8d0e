//! Bridge error types and wire codes

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;
use tspl_printer::PrintError;

/// Error codes reported to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// The request was malformed
    ArgError,
    /// The job could be neither printed nor saved
    PrintError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ArgError => "ARG_ERROR",
            Self::PrintError => "PRINT_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dispatcher error types
#[derive(Debug, Error)]
pub enum BridgeError {
    /// A required argument (or the whole argument map) was absent or null
    #[error("{}", missing_message(.0))]
    MissingArgument(String),

    /// An argument had the wrong shape
    #[error("Invalid '{field}' argument: expected {expected}")]
    InvalidArgumentType {
        field: String,
        expected: &'static str,
    },

    /// The request envelope could not be decoded
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// The method is not handled by this bridge
    #[error("Method not implemented: {0}")]
    UnsupportedOperation(String),

    /// Invalid bridge configuration
    #[error("Invalid config: {0}")]
    Config(String),

    /// Printing and fallback both failed, or handling panicked
    #[error("{0}")]
    InternalFailure(String),
}

impl BridgeError {
    /// Wire code for this error; `None` means "not implemented"
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::MissingArgument(_)
            | Self::InvalidArgumentType { .. }
            | Self::MalformedRequest(_) => Some(ErrorCode::ArgError),
            Self::UnsupportedOperation(_) => None,
            Self::Config(_) | Self::InternalFailure(_) => Some(ErrorCode::PrintError),
        }
    }

    /// Structured context for the caller, if any
    pub fn details(&self) -> Option<Value> {
        match self {
            Self::MissingArgument(field) => Some(json!({ "field": field })),
            Self::InvalidArgumentType { field, expected } => {
                Some(json!({ "field": field, "expected": expected }))
            }
            _ => None,
        }
    }
}

fn missing_message(field: &str) -> String {
    if field == "arguments" {
        "Missing arguments".to_string()
    } else {
        format!("Missing '{}' argument", field)
    }
}

impl From<PrintError> for BridgeError {
    fn from(err: PrintError) -> Self {
        Self::InternalFailure(err.to_string())
    }
}

/// Result type for bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;
