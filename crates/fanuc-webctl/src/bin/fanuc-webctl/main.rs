//! `fanuc-webctl` command-line entry point.

mod cli;
mod exit;
mod get;
mod info;
mod port;
mod reset;
mod style;

use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use fanuc_webctl::{connect, ClientConfig, Connection};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{}", style::error(format!("error: {err:#}")));
            ExitCode::from(exit::classify_error(&err))
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = client_config(&cli)?;
    init_logging(&config.log_level);
    let conn = open(&config)?;
    match cli.command {
        Command::Get { variable, .. } => get::run_get(&conn, &variable),
        Command::Read {
            port_type,
            index,
            status,
            ..
        } => port::run_read(&conn, &port_type, index, status),
        Command::Write {
            port_type,
            index,
            value,
            check,
            ..
        } => port::run_write(&conn, &port_type, index, value, check),
        Command::Reset { verify, .. } => reset::run_reset(&conn, verify),
        Command::Info { .. } => info::run_info(&conn),
    }
}

fn client_config(cli: &Cli) -> anyhow::Result<ClientConfig> {
    let mut config = match &cli.config {
        Some(path) => ClientConfig::load(path)?,
        None => ClientConfig::new(cli.command.host()),
    };
    config.host = cli.command.host().into();
    if cli.no_upload || !cli.command.needs_helpers() {
        config.skip_helper_upload = true;
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.request_timeout = Duration::from_millis(timeout_ms);
    }
    Ok(config)
}

fn open(config: &ClientConfig) -> anyhow::Result<Connection> {
    connect(config).with_context(|| format!("connecting to {}", config.host))
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new(fanuc_webctl::config::DEFAULT_LOG_LEVEL));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
