//! Configuration file loading and resolution.
//!
//! Credentials and endpoints come from a line-oriented `key: "value"`
//! file (quotes optional, `#` starts a comment):
//!
//! ```text
//! username: "u1234567"
//! password: "hunter2"
//! # optional overrides
//! user_agent: "Mozilla/5.0 (...)"
//! auth_url: "https://ids.example.edu"
//! events_url: "https://lnt.example.edu"
//! ```
//!
//! ## Precedence
//!
//! Settings are resolved with the following precedence (highest first):
//! 1. CLI flags
//! 2. Environment variables
//! 3. Config file
//! 4. Built-in defaults
//!
//! ## Environment Variables
//!
//! - `ROLLWATCH_USERNAME` / `ROLLWATCH_PASSWORD`: credentials
//! - `ROLLWATCH_USER_AGENT`: User-Agent header
//! - `ROLLWATCH_AUTH_URL` / `ROLLWATCH_EVENTS_URL`: service base URLs
//! - `ROLLWATCH_CONFIG`: config file path (read by the CLI layer)

use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::args::Cli;
use crate::core::auth::Credentials;
use crate::core::http;
use crate::error::{Result, RollwatchError};

// =============================================================================
// Environment Variable Names
// =============================================================================

/// Environment variable for the account name.
pub const ENV_USERNAME: &str = "ROLLWATCH_USERNAME";
/// Environment variable for the account password.
pub const ENV_PASSWORD: &str = "ROLLWATCH_PASSWORD";
/// Environment variable for the User-Agent header.
pub const ENV_USER_AGENT: &str = "ROLLWATCH_USER_AGENT";
/// Environment variable for the authentication portal base URL.
pub const ENV_AUTH_URL: &str = "ROLLWATCH_AUTH_URL";
/// Environment variable for the attendance service base URL.
pub const ENV_EVENTS_URL: &str = "ROLLWATCH_EVENTS_URL";

// =============================================================================
// Defaults
// =============================================================================

/// Config file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "rollwatch.cfg";
/// Default authentication portal.
pub const DEFAULT_AUTH_URL: &str = "https://ids.xmu.edu.cn";
/// Default attendance service.
pub const DEFAULT_EVENTS_URL: &str = "https://lnt.xmu.edu.cn";

// =============================================================================
// Config File
// =============================================================================

/// Raw values read from the config file. All optional; resolution decides
/// what is required.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub username: Option<String>,
    pub password: Option<String>,
    pub user_agent: Option<String>,
    pub auth_url: Option<String>,
    pub events_url: Option<String>,
}

impl Config {
    /// Parse config file text. Later duplicates win; unknown keys are
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns [`RollwatchError::ConfigParse`] for a non-comment line
    /// without a `key: value` shape.
    pub fn parse(text: &str, origin: &str) -> Result<Self> {
        let mut config = Self::default();
        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once(':') else {
                return Err(RollwatchError::ConfigParse {
                    path: origin.to_string(),
                    message: format!("line {}: expected 'key: value'", index + 1),
                });
            };
            let value = value.trim().trim_matches('"').to_string();
            match key.trim() {
                "username" => config.username = Some(value),
                "password" => config.password = Some(value),
                "user_agent" => config.user_agent = Some(value),
                "auth_url" => config.auth_url = Some(value),
                "events_url" => config.events_url = Some(value),
                _ => {}
            }
        }
        Ok(config)
    }

    /// Load and parse a config file.
    ///
    /// # Errors
    ///
    /// Returns [`RollwatchError::ConfigNotFound`] when the file does not
    /// exist, or a parse/IO error.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(RollwatchError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }
        let text = fs::read_to_string(path)?;
        Self::parse(&text, &path.display().to_string())
    }
}

// =============================================================================
// Resolved Configuration
// =============================================================================

/// Fully resolved configuration after merging CLI flags, env vars, and
/// the config file.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Account credentials.
    pub credentials: Credentials,
    /// User-Agent header for all requests.
    pub user_agent: String,
    /// Authentication portal base URL.
    pub auth_url: String,
    /// Attendance service base URL.
    pub events_url: String,
}

impl ResolvedConfig {
    /// Resolve the final configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly named config file is missing or
    /// invalid, or if no username/password can be found anywhere.
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let file = Self::load_file(cli.config.as_deref())?;

        let username = env_value(ENV_USERNAME)
            .or_else(|| file.username.clone())
            .ok_or(RollwatchError::MissingCredential {
                key: "username",
                env: ENV_USERNAME,
            })?;
        let password = env_value(ENV_PASSWORD)
            .or_else(|| file.password.clone())
            .ok_or(RollwatchError::MissingCredential {
                key: "password",
                env: ENV_PASSWORD,
            })?;

        let user_agent = cli
            .user_agent
            .clone()
            .or_else(|| env_value(ENV_USER_AGENT))
            .or_else(|| file.user_agent.clone())
            .unwrap_or_else(|| http::DEFAULT_USER_AGENT.to_string());

        let auth_url = cli
            .auth_url
            .clone()
            .or_else(|| env_value(ENV_AUTH_URL))
            .or_else(|| file.auth_url.clone())
            .unwrap_or_else(|| DEFAULT_AUTH_URL.to_string());

        let events_url = cli
            .events_url
            .clone()
            .or_else(|| env_value(ENV_EVENTS_URL))
            .or_else(|| file.events_url.clone())
            .unwrap_or_else(|| DEFAULT_EVENTS_URL.to_string());

        Ok(Self {
            credentials: Credentials::new(username, password),
            user_agent,
            auth_url: auth_url.trim_end_matches('/').to_string(),
            events_url: events_url.trim_end_matches('/').to_string(),
        })
    }

    /// Load the config file: an explicit path must exist; the default
    /// path is optional (credentials may come from the environment).
    fn load_file(explicit: Option<&Path>) -> Result<Config> {
        if let Some(path) = explicit {
            return Config::load_from(path);
        }
        let default = PathBuf::from(DEFAULT_CONFIG_FILE);
        if default.exists() {
            Config::load_from(&default)
        } else {
            Ok(Config::default())
        }
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

// =============================================================================
// Tests
// =============================================================================
