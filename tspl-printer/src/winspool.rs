//! Windows spooler backend
//!
//! Thin wrapper over the winspool API. Every call maps onto one
//! [`Spooler`] primitive; pairing and ordering are handled by the session
//! guards.

use core::ffi::c_void;

use tracing::debug;
use windows::Win32::Graphics::Printing::{
    ClosePrinter, DOC_INFO_1W, EndDocPrinter, EndPagePrinter, GetDefaultPrinterW, OpenPrinterW,
    PRINTER_HANDLE, StartDocPrinterW, StartPagePrinter, WritePrinter,
};
use windows::core::{PCWSTR, PWSTR};

use crate::encoding::{from_wide, to_wide};
use crate::error::{PrintError, PrintResult};
use crate::spooler::{DocInfo, Spooler};

/// Windows driver spooler
///
/// Uses the Win32 print spooler to send raw jobs through installed drivers.
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsSpooler;

/// An open winspool printer handle
#[derive(Debug)]
pub struct WindowsSession {
    handle: PRINTER_HANDLE,
}

impl WindowsSpooler {
    pub fn new() -> Self {
        Self
    }
}

impl Spooler for WindowsSpooler {
    type Session = WindowsSession;

    fn default_printer(&self) -> PrintResult<Option<String>> {
        unsafe {
            let mut needed: u32 = 0;
            let _ = GetDefaultPrinterW(None, &mut needed);

            if needed == 0 {
                return Ok(None);
            }

            let mut buf: Vec<u16> = vec![0; needed as usize];
            let ok = GetDefaultPrinterW(Some(PWSTR(buf.as_mut_ptr())), &mut needed);

            if !ok.as_bool() {
                return Ok(None);
            }

            let name = from_wide(&buf)?;
            Ok(Some(name).filter(|n| !n.is_empty()))
        }
    }

    fn open(&self, printer: &str) -> PrintResult<WindowsSession> {
        let name_w = to_wide(printer);
        let mut handle = PRINTER_HANDLE::default();

        unsafe {
            OpenPrinterW(PCWSTR::from_raw(name_w.as_ptr()), &mut handle, None).map_err(|e| {
                PrintError::PrinterUnavailable(format!("OpenPrinterW({}) failed: {}", printer, e))
            })?;
        }

        debug!(printer, "OpenPrinterW ok");
        Ok(WindowsSession { handle })
    }

    fn start_doc(&self, session: &mut WindowsSession, doc: &DocInfo<'_>) -> PrintResult<u32> {
        let doc_name_w = to_wide(doc.name);
        let datatype_w = to_wide(doc.datatype);
        let doc_info = DOC_INFO_1W {
            pDocName: PWSTR(doc_name_w.as_ptr() as *mut _),
            pOutputFile: PWSTR::null(),
            pDatatype: PWSTR(datatype_w.as_ptr() as *mut _),
        };

        let job_id = unsafe { StartDocPrinterW(session.handle, 1, &doc_info as *const DOC_INFO_1W) };
        if job_id == 0 {
            return Err(PrintError::StartDocument(format!(
                "StartDocPrinterW failed: {}",
                windows::core::Error::from_win32()
            )));
        }
        Ok(job_id)
    }

    fn start_page(&self, session: &mut WindowsSession) -> PrintResult<()> {
        if unsafe { StartPagePrinter(session.handle) }.as_bool() {
            Ok(())
        } else {
            Err(PrintError::StartPage(format!(
                "StartPagePrinter failed: {}",
                windows::core::Error::from_win32()
            )))
        }
    }

    fn write(&self, session: &mut WindowsSession, data: &[u8]) -> PrintResult<usize> {
        let len = u32::try_from(data.len())
            .map_err(|_| PrintError::Write(format!("payload too large: {} bytes", data.len())))?;

        let mut written: u32 = 0;
        let ok = unsafe {
            WritePrinter(
                session.handle,
                data.as_ptr() as *const c_void,
                len,
                &mut written,
            )
        };

        if !ok.as_bool() {
            return Err(PrintError::Write(format!(
                "WritePrinter failed: {}",
                windows::core::Error::from_win32()
            )));
        }
        Ok(written as usize)
    }

    fn end_page(&self, session: &mut WindowsSession) -> PrintResult<()> {
        if unsafe { EndPagePrinter(session.handle) }.as_bool() {
            Ok(())
        } else {
            Err(PrintError::Release("EndPagePrinter failed".to_string()))
        }
    }

    fn end_doc(&self, session: &mut WindowsSession) -> PrintResult<()> {
        if unsafe { EndDocPrinter(session.handle) }.as_bool() {
            Ok(())
        } else {
            Err(PrintError::Release("EndDocPrinter failed".to_string()))
        }
    }

    fn close(&self, session: WindowsSession) -> PrintResult<()> {
        unsafe { ClosePrinter(session.handle) }
            .map_err(|e| PrintError::WindowsPrinter(format!("ClosePrinter failed: {}", e)))
    }
}
