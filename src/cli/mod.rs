//! Command-line interface.

pub mod args;
pub mod code;
pub mod login;
pub mod status;
pub mod watch;

pub use args::{Cli, Commands};

use tracing::info;

use crate::core::auth::AuthSession;
use crate::core::http;
use crate::core::page::RegexExtractor;
use crate::error::Result;
use crate::storage::ResolvedConfig;

/// Build a client, run the login handshake, and hand back the
/// authenticated session. Shared by every command.
pub(crate) async fn authenticate(config: &ResolvedConfig) -> Result<AuthSession> {
    let client = http::build_client(&config.user_agent, http::DEFAULT_TIMEOUT)?;
    let mut session = AuthSession::new(client, config.auth_url.clone());
    let extractor = RegexExtractor::new();
    session.login(&extractor, &config.credentials).await?;
    info!(username = config.credentials.username(), "authenticated");
    Ok(session)
}
