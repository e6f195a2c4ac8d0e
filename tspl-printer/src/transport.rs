//! Raw print transport
//!
//! Sends one payload as one raw job: open the printer, start a document,
//! start a page, write everything in a single block. The guards in
//! [`crate::session`] close whatever was opened, in reverse order, on every
//! path out of [`RawTransport::try_send`].

use std::fmt;

use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::error::PrintError;
use crate::resolver::ResolvedTarget;
use crate::session::PrinterSession;
use crate::spooler::{DocInfo, Spooler};

/// Document name used when none is configured
pub const DEFAULT_DOC_NAME: &str = "TTP244 Job";

/// Transport state machine stages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportStage {
    Opening,
    JobStarted,
    PageStarted,
    Writing,
}

impl fmt::Display for TransportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Opening => "opening",
            Self::JobStarted => "job_started",
            Self::PageStarted => "page_started",
            Self::Writing => "writing",
        };
        f.write_str(name)
    }
}

/// A failed delivery attempt
#[derive(Debug, Error)]
#[error("transport failed while {stage}: {source}")]
pub struct TransportFailure {
    pub stage: TransportStage,
    #[source]
    pub source: PrintError,
}

impl TransportFailure {
    fn at(stage: TransportStage) -> impl FnOnce(PrintError) -> Self {
        move |source| Self { stage, source }
    }
}

/// Single-attempt raw job sender
#[derive(Debug, Clone)]
pub struct RawTransport {
    doc_name: String,
}

impl Default for RawTransport {
    fn default() -> Self {
        Self::new(DEFAULT_DOC_NAME)
    }
}

impl RawTransport {
    pub fn new(doc_name: impl Into<String>) -> Self {
        Self {
            doc_name: doc_name.into(),
        }
    }

    pub fn doc_name(&self) -> &str {
        &self.doc_name
    }

    /// Deliver the payload, returning `true` only if every byte was accepted
    pub fn send<S: Spooler>(&self, spooler: &S, target: &ResolvedTarget, payload: &[u8]) -> bool {
        match self.try_send(spooler, target, payload) {
            Ok(_) => true,
            Err(e) => {
                warn!(printer = %target, stage = %e.stage, error = %e.source, "raw print failed");
                false
            }
        }
    }

    /// Deliver the payload, reporting which stage failed
    ///
    /// Returns the number of bytes written. A write the spooler only
    /// partially accepts is a failure even if it raised no error.
    #[instrument(skip(self, spooler, target, payload), fields(printer = %target, len = payload.len()))]
    pub fn try_send<S: Spooler>(
        &self,
        spooler: &S,
        target: &ResolvedTarget,
        payload: &[u8],
    ) -> Result<usize, TransportFailure> {
        let mut session = PrinterSession::open(spooler, target.name())
            .map_err(TransportFailure::at(TransportStage::Opening))?;

        let mut doc = session
            .start_doc(&DocInfo::raw(&self.doc_name))
            .map_err(TransportFailure::at(TransportStage::JobStarted))?;

        let mut page = doc
            .start_page()
            .map_err(TransportFailure::at(TransportStage::PageStarted))?;

        let written = page
            .write(payload)
            .map_err(TransportFailure::at(TransportStage::Writing))?;

        if written != payload.len() {
            return Err(TransportFailure {
                stage: TransportStage::Writing,
                source: PrintError::ShortWrite {
                    written,
                    expected: payload.len(),
                },
            });
        }

        info!(bytes = written, "raw print job sent");
        Ok(written)
    }
}
