//! CareerPath CLI - career role predictions from the terminal

mod commands;
mod config;
mod logging;
mod state_dir;

use anyhow::Result;
use careerpath_http::{SessionEvent, SessionSignal};
use clap::{Parser, ValueEnum};
use commands::Commands;
use state_dir::StateDir;
use std::path::PathBuf;
use tracing::{Level, error, info};

#[derive(Parser)]
#[command(name = "careerpath")]
#[command(about = "Predict career roles from skills and resumes")]
#[command(version)]
struct Cli {
    /// Set logging level
    #[arg(short = 'l', long, global = true, default_value = "warn")]
    log_level: LogLevel,

    /// Directory for configuration, stored tokens and logs
    #[arg(short = 'd', long, global = true)]
    data_dir: Option<PathBuf>,

    /// Configuration file (defaults to config.json in the data directory)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// API base URL, overriding the configuration
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Request timeout in seconds, overriding the configuration
    #[arg(short = 't', long, global = true)]
    timeout: Option<u64>,

    /// Disable file logging (only log to stderr)
    #[arg(long, global = true)]
    no_file_log: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let state_dir = StateDir::resolve(cli.data_dir);

    let log_file = (!cli.no_file_log).then(|| state_dir.log_path());
    logging::init_logging(cli.log_level.into(), log_file.as_deref())?;

    let config = config::load_config(
        cli.config.as_deref(),
        &state_dir,
        config::Overrides {
            api_url: cli.api_url,
            timeout_secs: cli.timeout,
        },
    )?;
    info!(api = %config.api_base_url, "Starting CareerPath CLI");

    let session = SessionSignal::new();
    let mut events = session.subscribe();
    let client = config.build_client(session)?;

    let result = cli.command.execute(&client, &config, &state_dir).await;

    if let Ok(SessionEvent::Expired) = events.try_recv() {
        eprintln!("Session expired. Run `careerpath login` to sign in again.");
    }

    if let Err(e) = result {
        error!("Command failed: {e:#}");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
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
            LogLevel::Error => Self::ERROR,
            LogLevel::Warn => Self::WARN,
            LogLevel::Info => Self::INFO,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Trace => Self::TRACE,
        }
    }
}
