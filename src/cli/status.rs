//! The `status` command: one poll, list pending roll calls.

use crate::cli::args::Cli;
use crate::core::poller::EventPoller;
use crate::error::Result;
use crate::storage::ResolvedConfig;

/// Execute the status command.
///
/// # Errors
///
/// Returns configuration errors or any login handshake failure. A failed
/// poll reports as "nothing pending", like a loop cycle would.
pub async fn execute(cli: &Cli) -> Result<()> {
    let config = ResolvedConfig::resolve(cli)?;
    let session = super::authenticate(&config).await?;
    let poller = EventPoller::for_session(&session, &config.events_url)?;

    let pending = poller.poll().await;
    if pending.is_empty() {
        println!("No pending roll calls.");
        return Ok(());
    }

    println!("Pending roll calls:");
    for (title, id) in &pending {
        println!("  {title} (id {id})");
    }
    Ok(())
}
