//! Command dispatcher
//!
//! Entry point for calls arriving from the host channel. A print call is
//! settled in one pass: resolve the printer, try one raw job, and save the
//! payload to disk if that does not succeed. Only malformed requests and a
//! failed fallback write reach the caller as errors.

use std::any::Any;
use std::borrow::Cow;
use std::panic::{AssertUnwindSafe, catch_unwind};

use encoding_rs::Encoding;
use serde_json::Value;
use tracing::{error, info, instrument, warn};
use tspl_printer::{
    FallbackStore, RawTransport, Spooler, payload_encoding, resolve_printer, transcode_payload,
};

use crate::config::BridgeConfig;
use crate::error::{BridgeError, BridgeResult, ErrorCode};
use crate::request::{MethodCall, PrintRequest};
use crate::response::{MethodResponse, PrintOutcome};

/// Sent when a response cannot be encoded
const ENCODE_FAILURE: &str =
    r#"{"status":"error","code":"PRINT_ERROR","message":"Response encoding failed"}"#;

/// Routes method calls to the print pipeline
pub struct Dispatcher<S: Spooler> {
    spooler: S,
    transport: RawTransport,
    fallback: FallbackStore,
    encoding: Option<&'static Encoding>,
    config: BridgeConfig,
}

impl<S: Spooler> Dispatcher<S> {
    /// Build a dispatcher over the given spooler
    ///
    /// Fails only if the configured payload encoding is unknown.
    pub fn new(spooler: S, config: BridgeConfig) -> BridgeResult<Self> {
        let encoding = config
            .payload_encoding
            .as_deref()
            .map(payload_encoding)
            .transpose()
            .map_err(|e| BridgeError::Config(e.to_string()))?;

        let transport = RawTransport::new(config.doc_name.clone());
        let fallback = FallbackStore::new(config.fallback_dir.clone())
            .with_prefix(config.fallback_prefix.clone())
            .with_extension(config.fallback_extension.clone());

        Ok(Self {
            spooler,
            transport,
            fallback,
            encoding,
            config,
        })
    }

    pub fn spooler(&self) -> &S {
        &self.spooler
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Handle one call; never panics
    #[instrument(skip(self, call), fields(method = %call.method))]
    pub fn handle(&self, call: &MethodCall) -> MethodResponse {
        match catch_unwind(AssertUnwindSafe(|| self.dispatch(call))) {
            Ok(Ok(result)) => MethodResponse::success(result),
            Ok(Err(e)) => {
                match e.code() {
                    Some(ErrorCode::ArgError) => warn!(error = %e, "rejected call"),
                    Some(ErrorCode::PrintError) => error!(error = %e, "call failed"),
                    None => info!("method not implemented"),
                }
                e.into()
            }
            Err(payload) => {
                let message = panic_message(payload);
                error!(panic = %message, "call handler panicked");
                BridgeError::InternalFailure(message).into()
            }
        }
    }

    /// Decode a JSON call, handle it, and encode the response
    pub fn handle_json(&self, line: &str) -> String {
        let response = match serde_json::from_str::<MethodCall>(line) {
            Ok(call) => self.handle(&call),
            Err(e) => {
                warn!(error = %e, "undecodable call");
                BridgeError::MalformedRequest(e.to_string()).into()
            }
        };

        serde_json::to_string(&response).unwrap_or_else(|e| {
            error!(error = %e, "response encoding failed");
            ENCODE_FAILURE.to_string()
        })
    }

    fn dispatch(&self, call: &MethodCall) -> BridgeResult<Value> {
        if call.method != self.config.print_method {
            return Err(BridgeError::UnsupportedOperation(call.method.clone()));
        }

        let request = PrintRequest::from_arguments(&call.arguments, self.config.strict_printer_name)?;
        let outcome = self.print(request)?;
        serde_json::to_value(&outcome).map_err(|e| BridgeError::InternalFailure(e.to_string()))
    }

    /// Print a request, saving it to disk if it cannot be delivered
    ///
    /// One resolution and one transport attempt, no retries. Only text
    /// payloads are re-encoded for the printer; the fallback file holds the
    /// request bytes exactly as received.
    #[instrument(skip(self, request), fields(len = request.commands().len(), printer = ?request.printer_name()))]
    pub fn print(&self, request: PrintRequest) -> BridgeResult<PrintOutcome> {
        // Byte payloads are already in the printer's encoding
        let payload = match self.encoding {
            Some(encoding) if request.is_text() => {
                Cow::Owned(transcode_payload(request.commands(), encoding))
            }
            _ => Cow::Borrowed(request.commands()),
        };

        match resolve_printer(&self.spooler, request.printer_name()) {
            Some(target) => {
                if self.transport.send(&self.spooler, &target, &payload) {
                    info!(printer = %target, source = ?target.source(), "job delivered");
                    return Ok(PrintOutcome::Delivered {
                        device_used: target.into_name(),
                    });
                }
            }
            None => info!("no printer available"),
        }

        let fallback_path = self.fallback.persist(request.commands())?;
        info!(path = %fallback_path.display(), "job deferred to fallback file");
        Ok(PrintOutcome::Deferred { fallback_path })
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        return (*msg).to_string();
    }
    if let Some(msg) = payload.downcast_ref::<String>() {
        return msg.clone();
    }
    "Unknown panic".to_string()
}
