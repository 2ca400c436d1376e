//! `movequest log`: poll the wearable and append readings to a CSV log.

use std::path::PathBuf;

use movequest_logger::{PollerConfig, PollingLogger};
use tokio_util::sync::CancellationToken;

/// Run the log command until Ctrl+C.
pub fn run(url: &str, output: &str, interval_ms: u64, timeout_ms: u64) {
    let config = PollerConfig {
        url: url.to_string(),
        output: PathBuf::from(output),
        interval: super::millis(interval_ms),
        timeout: super::millis(timeout_ms),
    };

    let logger = match PollingLogger::new(&config) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Error starting logger: {e}");
            std::process::exit(1);
        }
    };

    // Set up Ctrl+C handler
    let cancel = CancellationToken::new();
    let c = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || c.cancel()) {
        eprintln!("Error setting Ctrl+C handler: {e}");
        std::process::exit(1);
    }

    println!("Logging data from {} to {}", config.url, config.output.display());
    println!("  Interval:  {}ms", config.interval.as_millis());
    println!("  Timeout:   {}ms", config.timeout.as_millis());
    println!("Press Ctrl+C to stop.");
    println!();

    let rt = super::runtime();
    match rt.block_on(logger.run(cancel)) {
        Ok((path, stats)) => {
            println!();
            println!("Logging stopped.");
            println!("  Logged:    {}", stats.logged);
            println!("  Malformed: {}", stats.malformed);
            println!("  Failed:    {}", stats.failed);
            println!("  Output:    {}", path.display());
        }
        Err(e) => {
            eprintln!("Error closing log: {e}");
            std::process::exit(1);
        }
    }
}
