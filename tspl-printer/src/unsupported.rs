//! Spooler for targets without a print subsystem
//!
//! Every job fails to open, so requests always end in fallback persistence.

use crate::error::{PrintError, PrintResult};
use crate::spooler::{DocInfo, Spooler};

#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedSpooler;

/// Never constructed
#[derive(Debug)]
pub enum NoSession {}

impl Spooler for UnsupportedSpooler {
    type Session = NoSession;

    fn default_printer(&self) -> PrintResult<Option<String>> {
        Ok(None)
    }

    fn open(&self, _printer: &str) -> PrintResult<NoSession> {
        Err(PrintError::Unsupported)
    }

    fn start_doc(&self, session: &mut NoSession, _doc: &DocInfo<'_>) -> PrintResult<u32> {
        match *session {}
    }

    fn start_page(&self, session: &mut NoSession) -> PrintResult<()> {
        match *session {}
    }

    fn write(&self, session: &mut NoSession, _data: &[u8]) -> PrintResult<usize> {
        match *session {}
    }

    fn end_page(&self, session: &mut NoSession) -> PrintResult<()> {
        match *session {}
    }

    fn end_doc(&self, session: &mut NoSession) -> PrintResult<()> {
        match *session {}
    }

    fn close(&self, session: NoSession) -> PrintResult<()> {
        match session {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nothing_opens() {
        let spooler = UnsupportedSpooler;
        assert_eq!(spooler.default_printer().unwrap(), None);
        assert!(matches!(spooler.open("TTP244"), Err(PrintError::Unsupported)));
    }
}
