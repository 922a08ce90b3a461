//! rollwatch - Campus roll-call watcher
//!
//! CLI entry point.

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

use clap::Parser;
use std::process::ExitCode;

use rollwatch::cli::{Cli, Commands};
use rollwatch::core::logging;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = cli
        .log_level
        .as_deref()
        .and_then(logging::LogLevel::from_arg)
        .or_else(|| logging::parse_log_level_from_env().map(logging::LogLevel::from_tracing_level))
        .unwrap_or_default();
    let log_format = if cli.json_output {
        logging::LogFormat::Json
    } else {
        logging::parse_log_format_from_env().unwrap_or_default()
    };
    let log_file = logging::parse_log_file_from_env();
    logging::init(log_level, log_format, log_file, cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("error[{}]: {e}", e.error_code());
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

async fn run(cli: Cli) -> rollwatch::Result<()> {
    match &cli.command {
        None => {
            print_quickstart();
            Ok(())
        }

        Some(Commands::Login) => rollwatch::cli::login::execute(&cli).await,

        Some(Commands::Status) => rollwatch::cli::status::execute(&cli).await,

        Some(Commands::Code(args)) => rollwatch::cli::code::execute(&cli, args).await,

        Some(Commands::Watch(args)) => rollwatch::cli::watch::execute(&cli, args).await,
    }
}

/// Print quickstart help when no command is given.
fn print_quickstart() {
    println!(
        r#"rollwatch - Campus roll-call watcher

Log into the campus SSO portal and fetch answer codes for pending
attendance checks.

USAGE:
    rollwatch [OPTIONS] <COMMAND>

COMMANDS:
    login    Run the login handshake and report the outcome
    status   Poll once and list pending roll calls
    code     Fetch the answer code for a single roll call
    watch    Poll until roll calls are pending, then resolve their codes

QUICK START:
    rollwatch login                     # Verify credentials
    rollwatch status                    # Anything pending right now?
    rollwatch watch                     # Wait for a roll call, fetch its code
    rollwatch watch --continuous        # Keep watching after the first batch
    rollwatch code 141798               # Code for one known event id

Credentials come from ./rollwatch.cfg (or --config PATH):
    username: "u1234567"
    password: "hunter2"

For more help: rollwatch --help
"#
    );

    println!("Version: {}", env!("CARGO_PKG_VERSION"));
}
