pub mod plot;
pub mod poll;
pub mod receive;

use std::time::Duration;

/// Milliseconds from the command line. Zero is bumped to 1 ms.
pub fn millis(ms: u64) -> Duration {
    Duration::from_millis(ms.max(1))
}

/// Build a multi-threaded runtime or exit with a message.
pub fn runtime() -> tokio::runtime::Runtime {
    match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error starting async runtime: {e}");
            std::process::exit(1);
        }
    }
}
