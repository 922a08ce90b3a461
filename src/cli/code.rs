//! The `code` command: fetch the answer code of one roll call by id.

use crate::cli::args::{Cli, CodeArgs};
use crate::core::resolver::CodeResolver;
use crate::error::{Result, RollwatchError};
use crate::storage::ResolvedConfig;

/// Execute the code command.
///
/// # Errors
///
/// Returns configuration errors, login handshake failures, or
/// [`RollwatchError::ParseResponse`] when the event has no usable code.
pub async fn execute(cli: &Cli, args: &CodeArgs) -> Result<()> {
    let config = ResolvedConfig::resolve(cli)?;
    let session = super::authenticate(&config).await?;
    let resolver = CodeResolver::for_session(&session, &config.events_url)?;

    match resolver.resolve_one(args.id).await {
        Some(code) => {
            println!("Roll call {}: code {code}", args.id);
            Ok(())
        }
        None => Err(RollwatchError::ParseResponse(format!(
            "no answer code for roll call {}",
            args.id
        ))),
    }
}
