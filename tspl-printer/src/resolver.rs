//! Printer resolution
//!
//! Turns an optional caller-supplied printer name into a concrete target.
//! Nothing is cached, so a change of system default is picked up by the
//! next request.

use std::fmt;

use tracing::{debug, instrument, warn};

use crate::spooler::Spooler;

/// Where a resolved target came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSource {
    /// Named by the caller
    Explicit,
    /// The system default printer
    SystemDefault,
}

/// A concrete printer to send a job to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    name: String,
    source: TargetSource,
}

impl ResolvedTarget {
    pub fn new(name: impl Into<String>, source: TargetSource) -> Self {
        Self {
            name: name.into(),
            source,
        }
    }

    /// Printer name as the spooler knows it
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> TargetSource {
        self.source
    }

    pub fn into_name(self) -> String {
        self.name
    }
}

impl fmt::Display for ResolvedTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Resolve a printer name, defaulting to the system default printer
///
/// A non-empty name is used verbatim; whether the printer exists is only
/// discovered when the transport opens it. Returns `None` when no name was
/// given and the system has no usable default.
#[instrument(skip(spooler))]
pub fn resolve_printer<S: Spooler>(spooler: &S, requested: Option<&str>) -> Option<ResolvedTarget> {
    if let Some(name) = requested.filter(|n| !n.is_empty()) {
        return Some(ResolvedTarget::new(name, TargetSource::Explicit));
    }

    match spooler.default_printer() {
        Ok(Some(name)) if !name.is_empty() => {
            debug!(printer = %name, "using system default printer");
            Some(ResolvedTarget::new(name, TargetSource::SystemDefault))
        }
        Ok(_) => {
            debug!("no system default printer configured");
            None
        }
        Err(e) => {
            warn!(error = %e, "default printer query failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockSpooler, SpoolerCall};

    #[test]
    fn test_explicit_name_is_verbatim() {
        let spooler = MockSpooler::new().with_default("Office");
        let target = resolve_printer(&spooler, Some("TTP244")).unwrap();
        assert_eq!(target.name(), "TTP244");
        assert_eq!(target.source(), TargetSource::Explicit);
        // No existence check and no default lookup
        assert!(spooler.calls().is_empty());
    }

    #[test]
    fn test_empty_name_uses_default() {
        let spooler = MockSpooler::new().with_default("Office");
        let target = resolve_printer(&spooler, Some("")).unwrap();
        assert_eq!(target.name(), "Office");
        assert_eq!(target.source(), TargetSource::SystemDefault);
    }

    #[test]
    fn test_absent_name_uses_default() {
        let spooler = MockSpooler::new().with_default("TTP244");
        let target = resolve_printer(&spooler, None).unwrap();
        assert_eq!(target.to_string(), "TTP244");
        assert_eq!(spooler.calls(), vec![SpoolerCall::DefaultPrinter]);
    }

    #[test]
    fn test_no_default_is_no_target() {
        let spooler = MockSpooler::new();
        assert_eq!(resolve_printer(&spooler, None), None);
    }

    #[test]
    fn test_failing_default_query_is_no_target() {
        let spooler = MockSpooler::new().with_failing_default_query();
        assert_eq!(resolve_printer(&spooler, None), None);
    }

    #[test]
    fn test_resolution_is_not_cached() {
        let spooler = MockSpooler::new().with_default("A");
        resolve_printer(&spooler, None);
        resolve_printer(&spooler, None);
        assert_eq!(
            spooler.calls(),
            vec![SpoolerCall::DefaultPrinter, SpoolerCall::DefaultPrinter]
        );
    }
}
