//! CLI binary that logs stdin lines through the dual-mode logger.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use duolog::{Level, Locale, LogInput, Logger, LoggerConfig, Mode};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// CLI-specific error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Logger construction or configuration error
    #[error(transparent)]
    Logger(#[from] duolog::Error),

    /// Reading stdin failed
    #[error("failed to read stdin: {0}")]
    Stdin(#[from] std::io::Error),
}

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// TOML config file; flags given on the command line override it
    #[arg(long, env = "DUOLOG_CONFIG")]
    config: Option<PathBuf>,

    /// Output mode: console or file
    #[arg(long, env = "DUOLOG_MODE")]
    mode: Option<Mode>,

    /// Log file for file mode
    #[arg(long, env = "DUOLOG_FILE")]
    file: Option<PathBuf>,

    /// Directory relative file paths resolve against
    #[arg(long, env = "DUOLOG_BASE_DIR")]
    base_dir: Option<PathBuf>,

    /// Timestamp locale, e.g. ru-RU or en-US
    #[arg(long, env = "DUOLOG_LOCALE")]
    locale: Option<Locale>,

    /// Idle milliseconds before the log file is closed
    #[arg(long, env = "DUOLOG_IDLE_MS")]
    idle_ms: Option<u64>,

    /// Level for plain lines
    #[arg(long, default_value = "info", env = "DUOLOG_LEVEL")]
    level: Level,

    /// Treat lines that are JSON objects as `{level, message}` records
    #[arg(long, env = "DUOLOG_JSON")]
    json: bool,
}

fn build_config(args: &Args) -> Result<LoggerConfig, Error> {
    let mut config = match &args.config {
        Some(path) => LoggerConfig::from_toml_file(path)?,
        None => LoggerConfig::default(),
    };

    if let Some(mode) = args.mode {
        config.mode = mode;
    }
    if let Some(file) = &args.file {
        config.file_path = Some(file.clone());
    }
    if let Some(base_dir) = &args.base_dir {
        config.base_dir = Some(base_dir.clone());
    }
    if let Some(locale) = args.locale {
        config.locale = locale;
    }
    if let Some(idle_ms) = args.idle_ms {
        config.time_to_close_file = Duration::from_millis(idle_ms);
    }

    config.validate()?;
    Ok(config)
}

fn log_line(logger: &Logger, args: &Args, line: String) {
    if args.json
        && let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(&line)
    {
        match LogInput::from_value(&value) {
            Some(input) => logger.log(input),
            None => debug!("skipping JSON line without a valid level and message"),
        }
        return;
    }

    logger.log((args.level, line));
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Diagnostics go to stderr so they never mix with console-mode output
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = build_config(&args)?;
    info!(mode = %config.mode, "starting logger");

    let logger = Logger::new(config)?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => log_line(&logger, &args, line),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Received interrupt signal");
                break;
            }
        }
    }

    let written = logger.shutdown().await;
    debug!(written, "logger shut down");

    Ok(())
}
