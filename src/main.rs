use std::fs::OpenOptions;
use std::sync::Mutex;

use clap::Parser;
use taskmap::cli::commands::Cli;
use taskmap::cli::handlers;

/// Log to the file named by `TASKMAP_LOG`; stdout belongs to the TUI.
/// `TASKMAP_LOG_LEVEL` (error..trace) defaults to debug.
fn init_logging() {
    let Ok(path) = std::env::var("TASKMAP_LOG") else {
        return;
    };
    let file = match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("warning: cannot open log file {}: {}", path, e);
            return;
        }
    };
    let level = std::env::var("TASKMAP_LOG_LEVEL")
        .ok()
        .and_then(|l| l.parse::<tracing::Level>().ok())
        .unwrap_or(tracing::Level::DEBUG);
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(level)
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        None => {
            // No subcommand → launch TUI
            handlers::resolve_start(cli.store_dir.as_deref()).and_then(|start| taskmap::tui::run(&start))
        }
        Some(_) => handlers::dispatch(cli),
    };
    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
