//! In-memory spooler for tests
//!
//! Records every primitive call, counts acquisitions and releases, keeps the
//! completed jobs, and can be told to fail at a chosen stage.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::{PrintError, PrintResult};
use crate::spooler::{DocInfo, Spooler};

/// A recorded spooler primitive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpoolerCall {
    DefaultPrinter,
    Open(String),
    StartDoc(String),
    StartPage,
    Write(usize),
    EndPage,
    EndDoc,
    Close,
}

/// Stage at which the mock misbehaves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    StartDoc,
    StartPage,
    Write,
    /// Accept at most this many bytes without reporting an error
    ShortWrite(usize),
}

/// Acquisition and release counts
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Counters {
    pub open_attempts: usize,
    pub opens: usize,
    pub closes: usize,
    pub docs_started: usize,
    pub docs_ended: usize,
    pub pages_started: usize,
    pub pages_ended: usize,
}

impl Counters {
    /// Every acquired resource was released exactly once
    pub fn is_balanced(&self) -> bool {
        self.opens == self.closes
            && self.docs_started == self.docs_ended
            && self.pages_started == self.pages_ended
    }
}

/// A document as the spooler saw it once it was ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedJob {
    pub job_id: u32,
    pub printer: String,
    pub doc_name: String,
    pub datatype: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Default)]
struct MockState {
    printers: Vec<String>,
    default_printer: Option<String>,
    default_query_fails: bool,
    fail_at: Option<FailAt>,
    calls: Vec<SpoolerCall>,
    counters: Counters,
    jobs: Vec<RecordedJob>,
    next_job_id: u32,
}

/// Handle state for [`MockSpooler`]
#[derive(Debug)]
pub struct MockSession {
    printer: String,
    job: Option<RecordedJob>,
}

/// Recording in-memory spooler
#[derive(Debug, Default)]
pub struct MockSpooler {
    state: Mutex<MockState>,
}

impl MockSpooler {
    /// A spooler with no printers installed
    pub fn new() -> Self {
        Self::default()
    }

    /// A spooler with the given printers installed
    pub fn with_printers<I, N>(printers: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        let spooler = Self::new();
        spooler.lock().printers = printers.into_iter().map(Into::into).collect();
        spooler
    }

    /// Set the system default printer
    pub fn with_default(self, printer: impl Into<String>) -> Self {
        self.lock().default_printer = Some(printer.into());
        self
    }

    /// Make the default printer query return an error
    pub fn with_failing_default_query(self) -> Self {
        self.lock().default_query_fails = true;
        self
    }

    /// Inject a failure
    pub fn fail_at(self, stage: FailAt) -> Self {
        self.lock().fail_at = Some(stage);
        self
    }

    /// All recorded calls, in order
    pub fn calls(&self) -> Vec<SpoolerCall> {
        self.lock().calls.clone()
    }

    /// Acquisition and release counts
    pub fn counters(&self) -> Counters {
        self.lock().counters
    }

    /// Documents that were started and ended
    pub fn jobs(&self) -> Vec<RecordedJob> {
        self.lock().jobs.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Spooler for MockSpooler {
    type Session = MockSession;

    fn default_printer(&self) -> PrintResult<Option<String>> {
        let mut state = self.lock();
        state.calls.push(SpoolerCall::DefaultPrinter);
        if state.default_query_fails {
            return Err(PrintError::DefaultPrinter("mock query failure".into()));
        }
        Ok(state.default_printer.clone())
    }

    fn open(&self, printer: &str) -> PrintResult<MockSession> {
        let mut state = self.lock();
        state.counters.open_attempts += 1;
        if !state.printers.iter().any(|p| p == printer) {
            return Err(PrintError::PrinterUnavailable(printer.to_string()));
        }
        state.counters.opens += 1;
        state.calls.push(SpoolerCall::Open(printer.to_string()));

        Ok(MockSession {
            printer: printer.to_string(),
            job: None,
        })
    }

    fn start_doc(&self, session: &mut MockSession, doc: &DocInfo<'_>) -> PrintResult<u32> {
        let mut state = self.lock();
        if state.fail_at == Some(FailAt::StartDoc) {
            return Err(PrintError::StartDocument("mock failure".into()));
        }
        state.next_job_id += 1;
        let job_id = state.next_job_id;
        state.counters.docs_started += 1;
        state.calls.push(SpoolerCall::StartDoc(doc.name.to_string()));

        session.job = Some(RecordedJob {
            job_id,
            printer: session.printer.clone(),
            doc_name: doc.name.to_string(),
            datatype: doc.datatype.to_string(),
            data: Vec::new(),
        });
        Ok(job_id)
    }

    fn start_page(&self, _session: &mut MockSession) -> PrintResult<()> {
        let mut state = self.lock();
        if state.fail_at == Some(FailAt::StartPage) {
            return Err(PrintError::StartPage("mock failure".into()));
        }
        state.counters.pages_started += 1;
        state.calls.push(SpoolerCall::StartPage);
        Ok(())
    }

    fn write(&self, session: &mut MockSession, data: &[u8]) -> PrintResult<usize> {
        let mut state = self.lock();
        let accepted = match state.fail_at {
            Some(FailAt::Write) => return Err(PrintError::Write("mock failure".into())),
            Some(FailAt::ShortWrite(limit)) => data.len().min(limit),
            _ => data.len(),
        };
        state.calls.push(SpoolerCall::Write(accepted));

        if let Some(job) = session.job.as_mut() {
            job.data.extend_from_slice(&data[..accepted]);
        }
        Ok(accepted)
    }

    fn end_page(&self, _session: &mut MockSession) -> PrintResult<()> {
        let mut state = self.lock();
        state.counters.pages_ended += 1;
        state.calls.push(SpoolerCall::EndPage);
        Ok(())
    }

    fn end_doc(&self, session: &mut MockSession) -> PrintResult<()> {
        let mut state = self.lock();
        state.counters.docs_ended += 1;
        state.calls.push(SpoolerCall::EndDoc);
        if let Some(job) = session.job.take() {
            state.jobs.push(job);
        }
        Ok(())
    }

    fn close(&self, _session: MockSession) -> PrintResult<()> {
        let mut state = self.lock();
        state.counters.closes += 1;
        state.calls.push(SpoolerCall::Close);
        Ok(())
    }
}
