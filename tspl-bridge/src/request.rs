//! Inbound call envelope and print request decoding

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::{BridgeError, BridgeResult};

/// Argument holding the printer command payload
pub const COMMANDS_ARG: &str = "commands";

/// Argument holding the optional printer name
pub const PRINTER_NAME_ARG: &str = "printerName";

const COMMANDS_EXPECTED: &str = "string or array of bytes";

/// A named call with its arguments, as received from the host channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }
}

/// A decoded print request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintRequest {
    commands: Vec<u8>,
    is_text: bool,
    printer_name: Option<String>,
}

impl PrintRequest {
    /// A request whose commands were sent as text
    pub fn from_text(commands: impl Into<String>, printer_name: Option<String>) -> Self {
        Self {
            commands: commands.into().into_bytes(),
            is_text: true,
            printer_name,
        }
    }

    /// A request whose commands were sent as raw bytes
    pub fn from_bytes(commands: impl Into<Vec<u8>>, printer_name: Option<String>) -> Self {
        Self {
            commands: commands.into(),
            is_text: false,
            printer_name,
        }
    }

    /// Raw printer command bytes
    pub fn commands(&self) -> &[u8] {
        &self.commands
    }

    /// Whether the commands arrived as text (and may be re-encoded)
    pub fn is_text(&self) -> bool {
        self.is_text
    }

    pub fn printer_name(&self) -> Option<&str> {
        self.printer_name.as_deref()
    }

    /// Decode call arguments
    ///
    /// `commands` may be a string or an array of byte values. A
    /// `printerName` that is not a string is ignored with a warning, unless
    /// `strict_printer_name` is set, in which case it is rejected.
    pub fn from_arguments(arguments: &Value, strict_printer_name: bool) -> BridgeResult<Self> {
        let args = match arguments {
            Value::Object(map) => map,
            Value::Null => return Err(BridgeError::MissingArgument("arguments".into())),
            _ => {
                return Err(BridgeError::InvalidArgumentType {
                    field: "arguments".into(),
                    expected: "object",
                });
            }
        };

        let (commands, is_text) = decode_commands(args)?;
        let printer_name = decode_printer_name(args, strict_printer_name)?;

        Ok(Self {
            commands,
            is_text,
            printer_name,
        })
    }
}

/// Payload bytes and whether they were sent as a string
fn decode_commands(args: &Map<String, Value>) -> BridgeResult<(Vec<u8>, bool)> {
    let invalid = || BridgeError::InvalidArgumentType {
        field: COMMANDS_ARG.into(),
        expected: COMMANDS_EXPECTED,
    };

    match args.get(COMMANDS_ARG) {
        None | Some(Value::Null) => Err(BridgeError::MissingArgument(COMMANDS_ARG.into())),
        Some(Value::String(text)) => Ok((text.as_bytes().to_vec(), true)),
        Some(Value::Array(items)) => {
            let bytes = items
                .iter()
                .map(|item| {
                    item.as_u64()
                        .and_then(|b| u8::try_from(b).ok())
                        .ok_or_else(invalid)
                })
                .collect::<BridgeResult<Vec<u8>>>()?;
            Ok((bytes, false))
        }
        Some(_) => Err(invalid()),
    }
}

fn decode_printer_name(args: &Map<String, Value>, strict: bool) -> BridgeResult<Option<String>> {
    match args.get(PRINTER_NAME_ARG) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(name)) => Ok(Some(name.clone())),
        Some(other) if strict => {
            warn!(value = %other, "rejecting non-string printer name");
            Err(BridgeError::InvalidArgumentType {
                field: PRINTER_NAME_ARG.into(),
                expected: "string",
            })
        }
        Some(other) => {
            warn!(value = %other, "ignoring non-string printer name, using system default");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_commands() {
        let req = PrintRequest::from_arguments(
            &json!({ "commands": "SIZE 40mm,30mm\nPRINT 1\n", "printerName": "TTP244" }),
            false,
        )
        .unwrap();
        assert_eq!(req.commands(), b"SIZE 40mm,30mm\nPRINT 1\n");
        assert!(req.is_text());
        assert_eq!(req.printer_name(), Some("TTP244"));
    }

    #[test]
    fn test_byte_array_commands() {
        let req = PrintRequest::from_arguments(&json!({ "commands": [67, 76, 83, 10, 0, 255] }), false)
            .unwrap();
        assert_eq!(req.commands(), &[67, 76, 83, 10, 0, 255]);
        assert!(!req.is_text());
        assert_eq!(req.printer_name(), None);
    }

    #[test]
    fn test_out_of_range_byte_is_invalid() {
        let err = PrintRequest::from_arguments(&json!({ "commands": [1, 256] }), false).unwrap_err();
        assert!(matches!(err, BridgeError::InvalidArgumentType { ref field, .. } if field == "commands"));

        let err = PrintRequest::from_arguments(&json!({ "commands": [-1] }), false).unwrap_err();
        assert!(matches!(err, BridgeError::InvalidArgumentType { .. }));
    }

    #[test]
    fn test_missing_commands() {
        for args in [json!({}), json!({ "commands": null }), json!({ "printerName": "TTP244" })] {
            let err = PrintRequest::from_arguments(&args, false).unwrap_err();
            assert!(matches!(err, BridgeError::MissingArgument(ref f) if f == "commands"));
        }
    }

    #[test]
    fn test_wrong_commands_type() {
        for args in [json!({ "commands": 42 }), json!({ "commands": { "a": 1 } }), json!({ "commands": true })] {
            let err = PrintRequest::from_arguments(&args, false).unwrap_err();
            assert!(matches!(err, BridgeError::InvalidArgumentType { .. }));
        }
    }

    #[test]
    fn test_arguments_shape() {
        assert!(matches!(
            PrintRequest::from_arguments(&Value::Null, false),
            Err(BridgeError::MissingArgument(ref f)) if f == "arguments"
        ));
        assert!(matches!(
            PrintRequest::from_arguments(&json!("CLS"), false),
            Err(BridgeError::InvalidArgumentType { ref field, .. }) if field == "arguments"
        ));
    }

    #[test]
    fn test_non_string_printer_name_is_lenient_by_default() {
        let req = PrintRequest::from_arguments(&json!({ "commands": "CLS", "printerName": 7 }), false)
            .unwrap();
        assert_eq!(req.printer_name(), None);
    }

    #[test]
    fn test_non_string_printer_name_rejected_when_strict() {
        let err = PrintRequest::from_arguments(&json!({ "commands": "CLS", "printerName": 7 }), true)
            .unwrap_err();
        assert!(matches!(err, BridgeError::InvalidArgumentType { ref field, .. } if field == "printerName"));
    }

    #[test]
    fn test_method_call_without_arguments() {
        let call: MethodCall = serde_json::from_str(r#"{"method":"printTspl"}"#).unwrap();
        assert_eq!(call.method, "printTspl");
        assert_eq!(call.arguments, Value::Null);
    }
}
