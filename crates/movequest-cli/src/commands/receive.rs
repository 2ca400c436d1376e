//! `movequest receive`: ingest server plus live chart.
//!
//! The server runs on a tokio runtime in the background; the chart loop runs
//! on the main thread. They share nothing but the buffer.

use std::sync::Arc;
use std::time::Duration;

use movequest_core::TelemetryBuffer;
use movequest_server::ServerConfig;
use tokio_util::sync::CancellationToken;

use crate::tui::app::{App, Feed};

/// Options for the receive command.
pub struct ReceiveCommandConfig {
    pub host: String,
    pub port: u16,
    pub capacity: usize,
    pub refresh_ms: u64,
    pub request_timeout_ms: u64,
    pub headless: bool,
}

/// How long to wait for in-flight requests after shutdown is requested.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

pub fn run(cfg: ReceiveCommandConfig) {
    let config = ServerConfig {
        host: cfg.host,
        port: cfg.port,
        request_timeout: super::millis(cfg.request_timeout_ms),
    };
    let buffer = Arc::new(TelemetryBuffer::new(cfg.capacity));
    let rt = super::runtime();

    let listener = match rt.block_on(movequest_server::bind(&config)) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Error binding {}:{}: {e}", config.host, config.port);
            std::process::exit(1);
        }
    };

    let base = format!("http://{}:{}", config.host, config.port);
    println!("MoveQuest Receiver v{}", movequest_core::VERSION);
    println!("   {base}");
    println!("   Keeping the last {} samples", buffer.capacity());
    println!();
    println!("   Endpoints:");
    println!("     POST /api/step-data   Submit one reading (JSON)");
    println!("     GET  /api/data        Recent history");
    println!("     GET  /health          Buffer counters");
    println!();

    let shutdown = CancellationToken::new();
    let server = rt.spawn(movequest_server::serve(
        listener,
        Arc::clone(&buffer),
        config.request_timeout,
        shutdown.clone(),
    ));

    if cfg.headless {
        let s = shutdown.clone();
        if let Err(e) = ctrlc::set_handler(move || s.cancel()) {
            eprintln!("Error setting Ctrl+C handler: {e}");
            std::process::exit(1);
        }
        println!("Press Ctrl+C to stop.");
    } else {
        let header = format!("receiving on {base}");
        let mut app = App::new(Feed::Live(Arc::clone(&buffer)), header, super::millis(cfg.refresh_ms));
        if let Err(e) = app.run() {
            eprintln!("TUI error: {e}");
        }
        shutdown.cancel();
    }

    let result = rt.block_on(async move {
        let mut server = server;
        // Headless mode waits here for Ctrl+C; the TUI path has already cancelled.
        tokio::select! {
            r = &mut server => return Ok(r),
            _ = shutdown.cancelled() => {}
        }
        tokio::time::timeout(DRAIN_TIMEOUT, server).await
    });
    match result {
        Ok(Ok(Ok(()))) => {}
        Ok(Ok(Err(e))) => eprintln!("Server error: {e}"),
        Ok(Err(e)) => eprintln!("Server task failed: {e}"),
        Err(_) => log::warn!("server did not drain within {DRAIN_TIMEOUT:?}"),
    }

    println!(
        "Shutting down. {} samples received, {} retained.",
        buffer.total_appended(),
        buffer.len()
    );
}
