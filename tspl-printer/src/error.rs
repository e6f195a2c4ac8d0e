//! Error types for the printer library

use thiserror::Error;

/// Printer error types
#[derive(Debug, Error)]
pub enum PrintError {
    /// The spooler could not open the named printer
    #[error("Printer not available: {0}")]
    PrinterUnavailable(String),

    /// The spooler refused to start the document
    #[error("Start document failed: {0}")]
    StartDocument(String),

    /// The spooler refused to start the page
    #[error("Start page failed: {0}")]
    StartPage(String),

    /// Writing the payload to the spooler failed
    #[error("Write failed: {0}")]
    Write(String),

    /// The spooler accepted fewer bytes than requested
    #[error("Incomplete write: {written} of {expected} bytes accepted")]
    ShortWrite { written: usize, expected: usize },

    /// Releasing a spooler resource failed
    #[error("Release failed: {0}")]
    Release(String),

    /// A guard was used after its session was released
    #[error("Session already closed")]
    SessionClosed,

    /// Default printer lookup failed
    #[error("Default printer query failed: {0}")]
    DefaultPrinter(String),

    /// IO error (spooler process, fallback file)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid printer configuration
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Platform string conversion failed
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// No spooler exists on this platform
    #[error("Printing not supported on this platform")]
    Unsupported,

    /// Windows-specific printing error
    #[cfg(windows)]
    #[error("Windows printer error: {0}")]
    WindowsPrinter(String),
}

/// Result type for printer operations
pub type PrintResult<T> = Result<T, PrintError>;
