//! Scoped spooler resources
//!
//! Three nested guards mirror the spooler's own nesting: a
//! [`PrinterSession`] owns the open printer, a [`DocumentGuard`] borrows it
//! while a job is in progress, and a [`PageGuard`] borrows the document while
//! a page is open. Each guard releases its resource in `Drop`, so the borrow
//! checker enforces page → document → session teardown order and an early
//! `?` return releases exactly what was acquired.
//!
//! Release failures are logged and swallowed: by the time a guard drops
//! there is nobody left to hand the error to.

use tracing::{debug, warn};

use crate::error::{PrintError, PrintResult};
use crate::spooler::{DocInfo, Spooler};

/// An open printer, closed on drop
pub struct PrinterSession<'s, S: Spooler> {
    spooler: &'s S,
    printer: String,
    session: Option<S::Session>,
}

impl<'s, S: Spooler> PrinterSession<'s, S> {
    /// Open a session on the named printer
    pub fn open(spooler: &'s S, printer: &str) -> PrintResult<Self> {
        let session = spooler.open(printer)?;
        debug!(printer, "printer session opened");

        Ok(Self {
            spooler,
            printer: printer.to_string(),
            session: Some(session),
        })
    }

    /// The printer this session was opened on
    pub fn printer(&self) -> &str {
        &self.printer
    }

    /// Begin a document; the returned guard ends it on drop
    pub fn start_doc(&mut self, doc: &DocInfo<'_>) -> PrintResult<DocumentGuard<'_, S>> {
        let spooler = self.spooler;
        let session = self.session.as_mut().ok_or(PrintError::SessionClosed)?;
        let job_id = spooler.start_doc(session, doc)?;
        debug!(printer = %self.printer, job_id, doc = doc.name, "document started");

        Ok(DocumentGuard {
            spooler,
            session,
            job_id,
        })
    }
}

impl<S: Spooler> Drop for PrinterSession<'_, S> {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            match self.spooler.close(session) {
                Ok(()) => debug!(printer = %self.printer, "printer session closed"),
                Err(e) => warn!(printer = %self.printer, error = %e, "close printer failed"),
            }
        }
    }
}

/// A started document, ended on drop
pub struct DocumentGuard<'p, S: Spooler> {
    spooler: &'p S,
    session: &'p mut S::Session,
    job_id: u32,
}

impl<S: Spooler> DocumentGuard<'_, S> {
    /// Spooler job id for this document
    pub fn job_id(&self) -> u32 {
        self.job_id
    }

    /// Begin a page; the returned guard ends it on drop
    pub fn start_page(&mut self) -> PrintResult<PageGuard<'_, S>> {
        self.spooler.start_page(self.session)?;
        debug!(job_id = self.job_id, "page started");

        Ok(PageGuard {
            spooler: self.spooler,
            session: &mut *self.session,
        })
    }
}

impl<S: Spooler> Drop for DocumentGuard<'_, S> {
    fn drop(&mut self) {
        match self.spooler.end_doc(self.session) {
            Ok(()) => debug!(job_id = self.job_id, "document ended"),
            Err(e) => warn!(job_id = self.job_id, error = %e, "end document failed"),
        }
    }
}

/// An open page, ended on drop
pub struct PageGuard<'d, S: Spooler> {
    spooler: &'d S,
    session: &'d mut S::Session,
}

impl<S: Spooler> PageGuard<'_, S> {
    /// Write raw bytes, returning how many the spooler accepted
    pub fn write(&mut self, data: &[u8]) -> PrintResult<usize> {
        self.spooler.write(self.session, data)
    }
}

impl<S: Spooler> Drop for PageGuard<'_, S> {
    fn drop(&mut self) {
        if let Err(e) = self.spooler.end_page(self.session) {
            warn!(error = %e, "end page failed");
        }
    }
}
