//! The `watch` command: the full poll/resolve reconciliation loop.

use crate::cli::args::{Cli, WatchArgs};
use crate::core::poller::EventPoller;
use crate::core::reconcile::{LoopOutcome, ReconciliationLoop};
use crate::core::resolver::CodeResolver;
use crate::error::Result;
use crate::storage::ResolvedConfig;

/// Execute the watch command.
///
/// # Errors
///
/// Returns configuration errors or any login handshake failure. Once the
/// loop is running, poll and resolution failures are absorbed per cycle
/// and per event.
pub async fn execute(cli: &Cli, args: &WatchArgs) -> Result<()> {
    args.validate()?;
    let config = ResolvedConfig::resolve(cli)?;
    let session = super::authenticate(&config).await?;

    let poller = EventPoller::for_session(&session, &config.events_url)?;
    let resolver = CodeResolver::for_session(&session, &config.events_url)?;
    let outcome = ReconciliationLoop::new(poller, resolver, args.loop_config())
        .run()
        .await;

    render_summary(&outcome);
    Ok(())
}

fn render_summary(outcome: &LoopOutcome) {
    if outcome.codes.is_empty() {
        println!(
            "No roll calls were resolved ({} poll cycles).",
            outcome.state.cycles
        );
        return;
    }

    println!("Roll-call summary:");
    for (title, code) in &outcome.codes {
        match code {
            Some(code) => println!("  ✅ {title}: code {code}"),
            None => println!("  ❌ {title}: code unavailable"),
        }
    }
}
