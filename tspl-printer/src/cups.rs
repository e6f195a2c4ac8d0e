//! CUPS spooler backend
//!
//! Drives the CUPS command-line tools. CUPS has no separate page calls, so
//! the job is submitted in one `lp -o raw` invocation when the payload is
//! written; the other primitives only track state.

use std::io::Write;
use std::process::{Command, Output, Stdio};

use tracing::{debug, info};

use crate::error::{PrintError, PrintResult};
use crate::spooler::{DocInfo, RAW_DATATYPE, Spooler};

/// Default submit command
pub const DEFAULT_LP_COMMAND: &str = "lp";

/// Default query command
pub const DEFAULT_LPSTAT_COMMAND: &str = "lpstat";

/// CUPS command-line spooler
#[derive(Debug, Clone)]
pub struct CupsSpooler {
    lp: String,
    lpstat: String,
}

/// An open CUPS destination
#[derive(Debug)]
pub struct CupsSession {
    printer: String,
    title: Option<String>,
    raw: bool,
}

impl Default for CupsSpooler {
    fn default() -> Self {
        Self::new(DEFAULT_LP_COMMAND, DEFAULT_LPSTAT_COMMAND)
    }
}

impl CupsSpooler {
    pub fn new(lp: impl Into<String>, lpstat: impl Into<String>) -> Self {
        Self {
            lp: lp.into(),
            lpstat: lpstat.into(),
        }
    }

    fn lpstat(&self, args: &[&str]) -> PrintResult<Output> {
        // Output is parsed, so keep the messages untranslated
        let output = Command::new(&self.lpstat)
            .args(args)
            .env("LC_ALL", "C")
            .stdin(Stdio::null())
            .output()?;
        Ok(output)
    }
}

impl Spooler for CupsSpooler {
    type Session = CupsSession;

    fn default_printer(&self) -> PrintResult<Option<String>> {
        let output = self.lpstat(&["-d"])?;
        let stdout = String::from_utf8_lossy(&output.stdout);

        if !output.status.success() {
            return Err(PrintError::DefaultPrinter(stderr_text(&output)));
        }
        Ok(parse_default_destination(&stdout))
    }

    fn open(&self, printer: &str) -> PrintResult<CupsSession> {
        let output = self.lpstat(&["-p", printer])?;
        if !output.status.success() {
            return Err(PrintError::PrinterUnavailable(format!(
                "{}: {}",
                printer,
                stderr_text(&output)
            )));
        }

        debug!(printer, "CUPS destination found");
        Ok(CupsSession {
            printer: printer.to_string(),
            title: None,
            raw: false,
        })
    }

    fn start_doc(&self, session: &mut CupsSession, doc: &DocInfo<'_>) -> PrintResult<u32> {
        session.title = Some(doc.name.to_string());
        session.raw = doc.datatype == RAW_DATATYPE;
        // The real job id is only known after submission
        Ok(1)
    }

    fn start_page(&self, _session: &mut CupsSession) -> PrintResult<()> {
        Ok(())
    }

    fn write(&self, session: &mut CupsSession, data: &[u8]) -> PrintResult<usize> {
        // lp refuses an empty stdin, so there is nothing to submit
        if data.is_empty() {
            debug!(printer = %session.printer, "empty payload, no CUPS job submitted");
            return Ok(0);
        }

        let mut cmd = Command::new(&self.lp);
        cmd.arg("-d").arg(&session.printer);
        if let Some(title) = &session.title {
            cmd.arg("-t").arg(title);
        }
        if session.raw {
            cmd.args(["-o", "raw"]);
        }

        let mut child = cmd
            .env("LC_ALL", "C")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // The child is reaped whether or not it took all of stdin
        let fed = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(data).and_then(|()| stdin.flush()),
            None => Ok(()),
        };

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(PrintError::Write(format!(
                "{} exited with {}: {}",
                self.lp,
                output.status,
                stderr_text(&output)
            )));
        }
        fed?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        match parse_request_id(&stdout) {
            Some(request) => info!(printer = %session.printer, request, "CUPS job queued"),
            None => info!(printer = %session.printer, "CUPS job queued"),
        }
        Ok(data.len())
    }

    fn end_page(&self, _session: &mut CupsSession) -> PrintResult<()> {
        Ok(())
    }

    fn end_doc(&self, session: &mut CupsSession) -> PrintResult<()> {
        session.title = None;
        session.raw = false;
        Ok(())
    }

    fn close(&self, _session: CupsSession) -> PrintResult<()> {
        Ok(())
    }
}

fn stderr_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).trim().to_string()
}

/// Extract the destination from `lpstat -d` output
pub fn parse_default_destination(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        line.trim()
            .strip_prefix("system default destination:")
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    })
}

/// Extract the request id from `lp` output
pub fn parse_request_id(output: &str) -> Option<&str> {
    output.lines().find_map(|line| {
        line.trim()
            .strip_prefix("request id is ")?
            .split_whitespace()
            .next()
    })
}
