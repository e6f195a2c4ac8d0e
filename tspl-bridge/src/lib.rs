//! # tspl-bridge
//!
//! Accepts TSPL print calls from a host application and settles each one
//! as either a delivered raw job or a saved fallback file.
//!
//! ## Example
//!
//! ```ignore
//! use serde_json::json;
//! use tspl_bridge::{BridgeConfig, Dispatcher, MethodCall};
//!
//! let config = BridgeConfig::from_env();
//! let dispatcher = Dispatcher::new(config.platform_spooler(), config)?;
//!
//! let call = MethodCall::new(
//!     "printTspl",
//!     json!({ "commands": "SIZE 40 mm,30 mm\nCLS\nPRINT 1\n", "printerName": "TTP244" }),
//! );
//! let response = dispatcher.handle(&call);
//! ```

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod logger;
pub mod request;
pub mod response;

// Re-exports
pub use config::BridgeConfig;
pub use dispatcher::Dispatcher;
pub use error::{BridgeError, BridgeResult, ErrorCode};
pub use request::{MethodCall, PrintRequest};
pub use response::{MethodResponse, PrintOutcome};
