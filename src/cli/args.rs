//! CLI argument definitions using clap.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::core::reconcile::{LoopConfig, LoopPolicy};
use crate::error::{Result, RollwatchError};

/// Campus roll-call watcher - detect pending attendance checks and fetch
/// their answer codes.
#[derive(Parser, Debug)]
#[command(name = "rollwatch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    // === Global flags ===
    /// Path to the credentials file
    #[arg(long, value_name = "PATH", env = "ROLLWATCH_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Authentication portal base URL
    #[arg(long, value_name = "URL", global = true)]
    pub auth_url: Option<String>,

    /// Attendance service base URL
    #[arg(long, value_name = "URL", global = true)]
    pub events_url: Option<String>,

    /// User-Agent header for all requests
    #[arg(long, value_name = "UA", global = true)]
    pub user_agent: Option<String>,

    /// Log level
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Emit JSONL logs to stderr
    #[arg(long, global = true)]
    pub json_output: bool,

    /// Verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the login handshake and report the outcome
    Login,

    /// Poll once and list pending roll calls
    Status,

    /// Fetch the answer code for a single roll call
    Code(CodeArgs),

    /// Poll until roll calls are pending, then resolve their codes
    Watch(WatchArgs),
}

/// Arguments for the `code` command.
#[derive(Parser, Debug)]
pub struct CodeArgs {
    /// Roll-call event id
    #[arg(value_name = "ID")]
    pub id: u64,
}

/// Arguments for the `watch` command.
#[derive(Parser, Debug)]
pub struct WatchArgs {
    /// Seconds between polls while nothing is pending
    #[arg(long, default_value = "2")]
    pub interval: u64,

    /// Cooldown seconds after resolving a batch
    #[arg(long, default_value = "200")]
    pub cooldown: u64,

    /// Keep monitoring after the first resolved batch
    #[arg(long)]
    pub continuous: bool,
}

impl WatchArgs {
    /// Validate argument combinations.
    ///
    /// # Errors
    ///
    /// Returns [`RollwatchError::InvalidArgument`] for a zero interval.
    pub fn validate(&self) -> Result<()> {
        if self.interval == 0 {
            return Err(RollwatchError::InvalidArgument {
                flag: "--interval".to_string(),
                message: "must be greater than 0 seconds".to_string(),
            });
        }
        Ok(())
    }

    /// Translate the flags into a loop configuration.
    #[must_use]
    pub const fn loop_config(&self) -> LoopConfig {
        LoopConfig {
            poll_interval: Duration::from_secs(self.interval),
            cooldown: Duration::from_secs(self.cooldown),
            policy: if self.continuous {
                LoopPolicy::Continuous
            } else {
                LoopPolicy::OneShot
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses() {
        Cli::command().debug_assert();
    }

    #[test]
    fn watch_args_reject_zero_interval() {
        let args = WatchArgs {
            interval: 0,
            cooldown: 200,
            continuous: false,
        };
        assert!(args.validate().is_err());
    }

    #[test]
    fn watch_args_map_to_loop_config() {
        let args = WatchArgs {
            interval: 5,
            cooldown: 60,
            continuous: true,
        };
        let config = args.loop_config();
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert_eq!(config.cooldown, Duration::from_secs(60));
        assert_eq!(config.policy, LoopPolicy::Continuous);
    }

    #[test]
    fn watch_defaults_match_service_cadence() {
        let cli = Cli::parse_from(["rollwatch", "watch"]);
        let Some(Commands::Watch(args)) = cli.command else {
            panic!("expected watch command");
        };
        assert_eq!(args.interval, 2);
        assert_eq!(args.cooldown, 200);
        assert!(!args.continuous);
    }
}
