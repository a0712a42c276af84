mod cli;
mod config;
mod error;
mod exec;
mod utils;

use std::process;
use std::time::Duration;

use clap::Parser;
use maven_fetch::{Fetcher, Platform};
use tracing::{debug, error};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use crate::{
    cli::CliArgs,
    config::FlywayConfig,
    error::{AppError, Result},
};

fn main() {
    match bootstrap() {
        Ok(code) => process::exit(code),
        Err(e) => {
            error!("Application error: {}", e);
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

#[tokio::main]
async fn bootstrap() -> Result<i32> {
    let args = CliArgs::parse();

    init_logging(args.verbose, args.quiet)?;

    let Some(config_path) = args.configfile.as_deref() else {
        return Err(AppError::config("Config file option is required"));
    };
    let config = FlywayConfig::load(config_path)?;
    debug!(path = ?config_path, "Loaded configuration");

    let platform = Platform::current()?;
    let fetch_config = config.fetch_config(
        Duration::from_secs(args.connect_timeout),
        Duration::from_secs(args.read_timeout),
    );
    let fetcher = Fetcher::new(fetch_config)?;

    exec::run(&config, args.command, &fetcher, platform).await
}

/// Logs go to stderr so Flyway's own output stays untouched
fn init_logging(verbose: bool, quiet: bool) -> Result<()> {
    let filter = log_filter(verbose, quiet, std::env::var("RUST_LOG").ok().as_deref());

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(verbose)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .try_init()
        .map_err(|e| AppError::Initialization(e.to_string()))
}

/// `--quiet` and `--verbose` win over `RUST_LOG`, which falls back to `info`
fn log_filter(verbose: bool, quiet: bool, rust_log: Option<&str>) -> EnvFilter {
    if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        rust_log
            .filter(|directives| !directives.trim().is_empty())
            .and_then(|directives| EnvFilter::try_new(directives).ok())
            .unwrap_or_else(|| EnvFilter::new("info"))
    }
}
