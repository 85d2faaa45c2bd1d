//! clipdeck - a scratchpad for text you are about to paste somewhere else.
//!
//! Type a question, some context and a code snippet, load an answer from a
//! file, and copy any of them (or all of them, joined) to the clipboard.
//! When the system clipboard is out of reach, copies go through the
//! platform's copy program instead.

mod app;
mod config;
mod models;
mod screens;
mod services;

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::{self, File};
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// clipdeck - copy text to the clipboard
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Config file path (default: ~/.config/clipdeck/config.toml)
    #[arg(short, long)]
    config: Option<String>,

    /// Skip the system clipboard and always use the copy command
    #[arg(long)]
    fallback_only: bool,

    /// File whose contents fill the answer panel
    #[arg(short, long)]
    answer: Option<String>,
}

/// Open the log file in the data directory. The TUI owns the terminal, so
/// logs only go to stderr when the file cannot be created.
fn open_log_file() -> Option<File> {
    let dir = config::Config::data_dir();
    fs::create_dir_all(&dir).ok()?;
    File::options()
        .create(true)
        .append(true)
        .open(dir.join("clipdeck.log"))
        .ok()
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging
    let filter = if args.debug {
        "clipdeck=debug,info"
    } else {
        "clipdeck=info,warn"
    };
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into());

    match open_log_file() {
        Some(file) => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init(),
        None => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }

    // Load configuration
    let mut config = if let Some(path) = args.config {
        config::Config::from_file(&path)?
    } else {
        config::Config::load()?
    };

    if args.fallback_only {
        config.clipboard.primary = false;
    }

    let answer = match args.answer {
        Some(path) => {
            let path = config::expand_path(&path);
            Some(
                fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read answer file {}", path))?,
            )
        }
        None => None,
    };

    // Run the TUI application
    let mut app = app::App::new(config, answer)?;
    app.run().await
}
