//! tspl-bridge: line-delimited JSON print bridge
//!
//! Reads one method call per line from stdin and writes one response per
//! line to stdout. Logs go to stderr.

use std::io::{BufRead, Write};

use tspl_bridge::logger::init_logger;
use tspl_bridge::{BridgeConfig, Dispatcher};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    let config = BridgeConfig::from_env();
    init_logger(&config.log_level);

    tracing::info!(
        method = %config.print_method,
        fallback_dir = %config.fallback_dir.display(),
        "tspl-bridge starting"
    );

    let dispatcher = Dispatcher::new(config.platform_spooler(), config)?;

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout().lock();

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let response = dispatcher.handle_json(&line);
        writeln!(stdout, "{}", response)?;
        stdout.flush()?;
    }

    tracing::info!("stdin closed, shutting down");
    Ok(())
}
