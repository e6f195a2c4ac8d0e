//! # tspl-printer
//!
//! Raw label printing through the operating system spooler.
//!
//! ## Scope
//!
//! This crate handles HOW a payload reaches a printer:
//! - Printer resolution (explicit name or system default)
//! - Raw single-page jobs with guaranteed teardown
//! - Fallback files when a job cannot be delivered
//! - Windows winspool and CUPS backends
//!
//! The payload is opaque here. Request handling lives in `tspl-bridge`.
//!
//! ## Example
//!
//! ```ignore
//! use tspl_printer::{FallbackStore, PlatformSpooler, RawTransport, resolve_printer};
//!
//! let spooler = PlatformSpooler::default();
//! let payload = b"SIZE 40 mm,30 mm\nCLS\nPRINT 1\n";
//!
//! let delivered = resolve_printer(&spooler, Some("TTP244"))
//!     .is_some_and(|target| RawTransport::default().send(&spooler, &target, payload));
//! if !delivered {
//!     let path = FallbackStore::default().persist(payload)?;
//! }
//! ```

pub mod encoding;
pub mod error;
pub mod fallback;
pub mod resolver;
pub mod session;
pub mod spooler;
pub mod transport;

#[cfg(windows)]
mod winspool;

#[cfg(unix)]
mod cups;

#[cfg(not(any(windows, unix)))]
mod unsupported;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-exports
pub use encoding::{payload_encoding, transcode_payload};
pub use error::{PrintError, PrintResult};
pub use fallback::FallbackStore;
pub use resolver::{ResolvedTarget, TargetSource, resolve_printer};
pub use session::{DocumentGuard, PageGuard, PrinterSession};
pub use spooler::{DocInfo, Spooler};
pub use transport::{RawTransport, TransportFailure, TransportStage};

#[cfg(windows)]
pub use winspool::{WindowsSession, WindowsSpooler};

#[cfg(unix)]
pub use cups::{CupsSession, CupsSpooler, DEFAULT_LP_COMMAND, DEFAULT_LPSTAT_COMMAND};

#[cfg(not(any(windows, unix)))]
pub use unsupported::UnsupportedSpooler;

/// The native spooler for the build target
#[cfg(windows)]
pub type PlatformSpooler = WindowsSpooler;

/// The native spooler for the build target
#[cfg(unix)]
pub type PlatformSpooler = CupsSpooler;

/// The native spooler for the build target
#[cfg(not(any(windows, unix)))]
pub type PlatformSpooler = UnsupportedSpooler;
