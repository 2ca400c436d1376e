//! CLI for MoveQuest: receive, watch and log wearable step telemetry.

mod commands;
mod tui;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "movequest")]
#[command(about = "movequest: receive, watch and log wearable step telemetry")]
#[command(version = movequest_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Accept readings pushed by the wearable and chart them live (TUI).
    /// Serves POST /api/step-data and GET /api/data.
    Receive {
        /// Port to listen on
        #[arg(long, default_value = "5000")]
        port: u16,

        /// Bind address
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Number of recent samples to keep in memory
        #[arg(long, default_value = "200")]
        capacity: usize,

        /// Chart refresh interval in milliseconds
        #[arg(long, default_value = "500")]
        refresh_ms: u64,

        /// Per-request time limit in milliseconds
        #[arg(long, default_value = "5000")]
        request_timeout_ms: u64,

        /// Run the server only, without the live chart
        #[arg(long)]
        headless: bool,
    },

    /// Poll the wearable's /data route and append each reading to a CSV log
    Log {
        /// URL serving one comma-separated reading per request
        #[arg(long, default_value = "http://172.20.10.2/data")]
        url: String,

        /// CSV file to append to (header written if new)
        #[arg(long, default_value = "accel_log.csv")]
        output: String,

        /// Poll interval in milliseconds
        #[arg(long, default_value = "50")]
        interval_ms: u64,

        /// Per-request time limit in milliseconds
        #[arg(long, default_value = "1000")]
        timeout_ms: u64,
    },

    /// Chart a CSV log written by `movequest log`
    Plot {
        /// Path to the CSV log
        #[arg(default_value = "accel_log.csv")]
        input: String,
    },
}

fn main() {
    let cli = Cli::parse();

    // The live chart owns the terminal; keep stderr quiet unless asked.
    let default_filter = match &cli.command {
        Commands::Receive { headless: false, .. } | Commands::Plot { .. } => "error",
        _ => "info",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match cli.command {
        Commands::Receive {
            port,
            host,
            capacity,
            refresh_ms,
            request_timeout_ms,
            headless,
        } => commands::receive::run(commands::receive::ReceiveCommandConfig {
            host,
            port,
            capacity,
            refresh_ms,
            request_timeout_ms,
            headless,
        }),
        Commands::Log {
            url,
            output,
            interval_ms,
            timeout_ms,
        } => commands::poll::run(&url, &output, interval_ms, timeout_ms),
        Commands::Plot { input } => commands::plot::run(&input),
    }
}
