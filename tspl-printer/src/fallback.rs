//! Fallback persistence for undeliverable jobs
//!
//! When a payload cannot reach a printer it is written verbatim to a
//! uniquely named file, so the exact bytes can be resubmitted or inspected
//! later.

use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{info, instrument, warn};

use crate::error::{PrintError, PrintResult};

/// Default file name prefix
pub const DEFAULT_PREFIX: &str = "ttp244";

/// Default file extension marking a deferred job
pub const DEFAULT_EXTENSION: &str = "tspl";

/// Name collisions tolerated before giving up
const MAX_ATTEMPTS: usize = 64;

/// Last id handed out in this process
static LAST_ID: AtomicU64 = AtomicU64::new(0);

/// Next file id: the current time in milliseconds, bumped forward so it is
/// strictly greater than any id issued before it.
fn next_id() -> u64 {
    let now = u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0);
    let prev = LAST_ID
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now.max(last + 1))
        })
        .unwrap_or_else(|last| last);
    now.max(prev + 1)
}

/// Writes deferred payloads to disk
#[derive(Debug, Clone)]
pub struct FallbackStore {
    dir: PathBuf,
    prefix: String,
    extension: String,
}

impl Default for FallbackStore {
    fn default() -> Self {
        Self::new(std::env::temp_dir())
    }
}

impl FallbackStore {
    /// A store writing into `dir` with the default name pattern
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            prefix: DEFAULT_PREFIX.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    /// Override the file name prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Override the file extension (without the dot)
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write the payload to a new file and return its absolute path
    ///
    /// Files are created with create-new semantics, so an existing file is
    /// never overwritten. A file that could not be fully written is removed
    /// before the error is returned.
    #[instrument(skip(self, payload), fields(dir = %self.dir.display(), len = payload.len()))]
    pub fn persist(&self, payload: &[u8]) -> PrintResult<PathBuf> {
        let dir = std::path::absolute(&self.dir)?;

        for _ in 0..MAX_ATTEMPTS {
            let path = dir.join(format!("{}_{}.{}", self.prefix, next_id(), self.extension));

            match write_new_file(&path, |file| {
                file.write_all(payload)?;
                file.sync_all()
            }) {
                Ok(()) => {
                    info!(path = %path.display(), "payload saved to fallback file");
                    return Ok(path);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(PrintError::Io(io::Error::new(
            ErrorKind::AlreadyExists,
            format!("no free fallback file name in {}", dir.display()),
        )))
    }
}

/// Create `path` and fill it, removing the file again if filling fails
fn write_new_file<F>(path: &Path, fill: F) -> io::Result<()>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;

    if let Err(e) = fill(&mut file) {
        drop(file);
        if let Err(remove_err) = fs::remove_file(path) {
            warn!(path = %path.display(), error = %remove_err, "failed to remove partial fallback file");
        }
        return Err(e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ids_strictly_increase() {
        let ids: Vec<u64> = (0..1000).map(|_| next_id()).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_persist_writes_exact_bytes() {
        let dir = TempDir::new().unwrap();
        let store = FallbackStore::new(dir.path());
        let payload = b"SIZE 40mm,30mm\r\nPRINT 1\r\n\x00\xff";

        let path = store.persist(payload).unwrap();

        assert!(path.is_absolute());
        assert_eq!(std::fs::read(&path).unwrap(), payload);
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("ttp244_"));
        assert!(name.ends_with(".tspl"));
    }

    #[test]
    fn test_identical_payloads_get_distinct_files() {
        let dir = TempDir::new().unwrap();
        let store = FallbackStore::new(dir.path());

        let first = store.persist(b"PRINT 1\n").unwrap();
        let second = store.persist(b"PRINT 1\n").unwrap();

        assert_ne!(first, second);
        assert_eq!(std::fs::read(&first).unwrap(), b"PRINT 1\n");
        assert_eq!(std::fs::read(&second).unwrap(), b"PRINT 1\n");
    }

    #[test]
    fn test_custom_name_pattern() {
        let dir = TempDir::new().unwrap();
        let store = FallbackStore::new(dir.path())
            .with_prefix("labels")
            .with_extension("prn");

        let path = store.persist(b"").unwrap();
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("labels_"));
        assert!(name.ends_with(".prn"));
        assert_eq!(std::fs::read(&path).unwrap(), b"");
    }

    #[test]
    fn test_missing_directory_is_error() {
        let dir = TempDir::new().unwrap();
        let store = FallbackStore::new(dir.path().join("does-not-exist"));
        assert!(matches!(store.persist(b"PRINT 1\n"), Err(PrintError::Io(_))));
    }

    #[test]
    fn test_failed_write_leaves_no_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ttp244_1.tspl");

        let err = write_new_file(&path, |file| {
            file.write_all(b"SIZE 40mm")?;
            Err(io::Error::other("No space left on device"))
        })
        .unwrap_err();

        assert_eq!(err.to_string(), "No space left on device");
        assert!(!path.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_existing_file_is_not_touched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ttp244_1.tspl");
        fs::write(&path, b"PRINT 1\n").unwrap();

        let err = write_new_file(&path, |file| file.write_all(b"CLS\n")).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        assert_eq!(fs::read(&path).unwrap(), b"PRINT 1\n");
    }
}
