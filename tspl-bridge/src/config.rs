//! Bridge configuration

use std::path::PathBuf;

use tspl_printer::PlatformSpooler;
use tspl_printer::fallback::{DEFAULT_EXTENSION, DEFAULT_PREFIX};
use tspl_printer::transport::DEFAULT_DOC_NAME;

/// Method name handled when none is configured
pub const DEFAULT_PRINT_METHOD: &str = "printTspl";

/// Bridge configuration
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Name of the supported method
    pub print_method: String,
    /// Document name shown in the spooler queue
    pub doc_name: String,
    pub fallback_dir: PathBuf,
    pub fallback_prefix: String,
    pub fallback_extension: String,
    /// WHATWG label of the printer's code page; `None` sends bytes as-is
    pub payload_encoding: Option<String>,
    /// Reject a non-string printer name instead of ignoring it
    pub strict_printer_name: bool,
    pub log_level: String,
    /// CUPS submit command
    pub lp_command: String,
    /// CUPS query command
    pub lpstat_command: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            print_method: DEFAULT_PRINT_METHOD.into(),
            doc_name: DEFAULT_DOC_NAME.into(),
            fallback_dir: std::env::temp_dir(),
            fallback_prefix: DEFAULT_PREFIX.into(),
            fallback_extension: DEFAULT_EXTENSION.into(),
            payload_encoding: None,
            strict_printer_name: false,
            log_level: "info".into(),
            lp_command: "lp".into(),
            lpstat_command: "lpstat".into(),
        }
    }
}

impl BridgeConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source, defaulting anything
    /// unset or empty
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Self {
            print_method: var("TSPL_PRINT_METHOD").unwrap_or(defaults.print_method),
            doc_name: var("TSPL_DOC_NAME").unwrap_or(defaults.doc_name),
            fallback_dir: var("TSPL_FALLBACK_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.fallback_dir),
            fallback_prefix: var("TSPL_FALLBACK_PREFIX").unwrap_or(defaults.fallback_prefix),
            fallback_extension: var("TSPL_FALLBACK_EXTENSION")
                .map(|ext| ext.trim_start_matches('.').to_string())
                .unwrap_or(defaults.fallback_extension),
            payload_encoding: var("TSPL_PAYLOAD_ENCODING"),
            strict_printer_name: var("TSPL_STRICT_PRINTER_NAME")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.strict_printer_name),
            log_level: var("TSPL_LOG_LEVEL").unwrap_or(defaults.log_level),
            lp_command: var("TSPL_LP_COMMAND").unwrap_or(defaults.lp_command),
            lpstat_command: var("TSPL_LPSTAT_COMMAND").unwrap_or(defaults.lpstat_command),
        }
    }

    /// The native spooler, configured
    pub fn platform_spooler(&self) -> PlatformSpooler {
        #[cfg(unix)]
        {
            PlatformSpooler::new(&self.lp_command, &self.lpstat_command)
        }
        #[cfg(not(unix))]
        {
            PlatformSpooler::default()
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> BridgeConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        BridgeConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.print_method, "printTspl");
        assert_eq!(config.doc_name, "TTP244 Job");
        assert_eq!(config.fallback_dir, std::env::temp_dir());
        assert_eq!(config.fallback_prefix, "ttp244");
        assert_eq!(config.fallback_extension, "tspl");
        assert_eq!(config.payload_encoding, None);
        assert!(!config.strict_printer_name);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("TSPL_PRINT_METHOD", "printLabel"),
            ("TSPL_DOC_NAME", "Shelf labels"),
            ("TSPL_FALLBACK_DIR", "/var/spool/labels"),
            ("TSPL_FALLBACK_EXTENSION", ".prn"),
            ("TSPL_PAYLOAD_ENCODING", "gbk"),
            ("TSPL_STRICT_PRINTER_NAME", "TRUE"),
            ("TSPL_LP_COMMAND", "/usr/bin/lp"),
        ]);
        assert_eq!(config.print_method, "printLabel");
        assert_eq!(config.doc_name, "Shelf labels");
        assert_eq!(config.fallback_dir, PathBuf::from("/var/spool/labels"));
        assert_eq!(config.fallback_extension, "prn");
        assert_eq!(config.payload_encoding.as_deref(), Some("gbk"));
        assert!(config.strict_printer_name);
        assert_eq!(config.lp_command, "/usr/bin/lp");
        assert_eq!(config.lpstat_command, "lpstat");
    }

    #[test]
    fn test_empty_and_bad_values_fall_back() {
        let config = config_from(&[
            ("TSPL_PRINT_METHOD", "  "),
            ("TSPL_STRICT_PRINTER_NAME", "maybe"),
        ]);
        assert_eq!(config.print_method, "printTspl");
        assert!(!config.strict_printer_name);
    }
}
