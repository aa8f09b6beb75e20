//! GSTPro CLI - terminal client for the GSTPro invoicing API

mod commands;
mod config;
mod logging;
mod session_store;
mod terminal;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use commands::{Commands, Options};
use gstpro_http::ClientError;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{Level, debug, error};

#[derive(Parser)]
#[command(name = "gstpro")]
#[command(about = "Manage GST invoices from the terminal")]
#[command(version)]
struct Cli {
    /// Set logging level
    #[arg(short = 'l', long, global = true, default_value = "warn")]
    log_level: LogLevel,

    /// Data directory holding the session and config files
    #[arg(short = 'd', long, global = true, env = "GSTPRO_STATE_DIR")]
    data_dir: Option<PathBuf>,

    /// Configuration file (defaults to <data dir>/config.toml)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Request timeout in seconds, overriding the config file (0 = none)
    #[arg(short = 't', long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init_logging(cli.log_level.into())?;

    let options = Options {
        data_dir: cli.data_dir,
        config: cli.config,
        timeout: cli.timeout.filter(|s| *s > 0).map(Duration::from_secs),
    };

    match cli.command.execute(options).await {
        Ok(()) => {
            debug!("Command completed successfully");
        }
        Err(e) => {
            // Cancelled requests were already reported through the login hint
            let cancelled = e
                .downcast_ref::<ClientError>()
                .is_some_and(ClientError::is_cancelled);
            if !cancelled {
                error!("Command failed: {e}");
            }
            std::process::exit(1);
        }
    }

    Ok(())
}

#[derive(Clone, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}
