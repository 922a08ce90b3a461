//! The `login` command: verify credentials against the portal.

use crate::cli::args::Cli;
use crate::error::Result;
use crate::storage::ResolvedConfig;

/// Execute the login command.
///
/// # Errors
///
/// Returns configuration errors or any login handshake failure.
pub async fn execute(cli: &Cli) -> Result<()> {
    let config = ResolvedConfig::resolve(cli)?;
    super::authenticate(&config).await?;
    println!(
        "Login OK for {} against {}",
        config.credentials.username(),
        config.auth_url
    );
    Ok(())
}
