//! Spooler backend abstraction
//!
//! A [`Spooler`] exposes the raw primitives of an OS print spooler. Callers
//! never use these directly: [`crate::session`] wraps them in guards that
//! pair every acquisition with its release.

use crate::error::PrintResult;

/// Datatype for jobs the driver must pass through untouched
pub const RAW_DATATYPE: &str = "RAW";

/// Document description passed when starting a job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocInfo<'a> {
    /// Name shown in the spooler queue
    pub name: &'a str,
    /// Spooler datatype
    pub datatype: &'a str,
}

impl<'a> DocInfo<'a> {
    /// A raw document: the device consumes the bytes as-is
    pub fn raw(name: &'a str) -> Self {
        Self {
            name,
            datatype: RAW_DATATYPE,
        }
    }
}

/// Trait for spooler backends
///
/// Each `open` must be matched by exactly one `close`, each successful
/// `start_doc` by one `end_doc`, and each successful `start_page` by one
/// `end_page`. Implementations do not need to enforce this themselves.
pub trait Spooler {
    /// Per-printer handle state
    type Session;

    /// Name of the system default printer, if one is configured
    fn default_printer(&self) -> PrintResult<Option<String>>;

    /// Open a session on the named printer
    fn open(&self, printer: &str) -> PrintResult<Self::Session>;

    /// Begin a document, returning the spooler job id
    fn start_doc(&self, session: &mut Self::Session, doc: &DocInfo<'_>) -> PrintResult<u32>;

    /// Begin a page within the current document
    fn start_page(&self, session: &mut Self::Session) -> PrintResult<()>;

    /// Write raw bytes, returning how many the spooler accepted
    fn write(&self, session: &mut Self::Session, data: &[u8]) -> PrintResult<usize>;

    /// End the current page
    fn end_page(&self, session: &mut Self::Session) -> PrintResult<()>;

    /// End the current document
    fn end_doc(&self, session: &mut Self::Session) -> PrintResult<()>;

    /// Close the session
    fn close(&self, session: Self::Session) -> PrintResult<()>;
}

impl<S: Spooler + ?Sized> Spooler for &S {
    type Session = S::Session;

    fn default_printer(&self) -> PrintResult<Option<String>> {
        (**self).default_printer()
    }

    fn open(&self, printer: &str) -> PrintResult<Self::Session> {
        (**self).open(printer)
    }

    fn start_doc(&self, session: &mut Self::Session, doc: &DocInfo<'_>) -> PrintResult<u32> {
        (**self).start_doc(session, doc)
    }

    fn start_page(&self, session: &mut Self::Session) -> PrintResult<()> {
        (**self).start_page(session)
    }

    fn write(&self, session: &mut Self::Session, data: &[u8]) -> PrintResult<usize> {
        (**self).write(session, data)
    }

    fn end_page(&self, session: &mut Self::Session) -> PrintResult<()> {
        (**self).end_page(session)
    }

    fn end_doc(&self, session: &mut Self::Session) -> PrintResult<()> {
        (**self).end_doc(session)
    }

    fn close(&self, session: Self::Session) -> PrintResult<()> {
        (**self).close(session)
    }
}
