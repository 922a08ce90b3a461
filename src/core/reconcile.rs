//! The poll/resolve reconciliation loop.
//!
//! Polls until roll calls are pending, resolves the whole batch, then
//! either exits after a cooldown (`OneShot`, the default) or keeps
//! monitoring (`Continuous`). Poll always strictly precedes resolve
//! within a cycle, and every cycle sees the service's then-current state.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::core::poller::EventPoller;
use crate::core::resolver::{CodeResolver, ResolvedCodes};

/// Delay between polls while nothing is pending.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Delay after a resolved batch, before exit or the next cycle.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(200);

/// What to do after a batch of roll calls has been resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopPolicy {
    /// Stop after the first resolved batch.
    #[default]
    OneShot,
    /// Keep monitoring for further batches.
    Continuous,
}

/// Timing and termination settings for the loop.
#[derive(Debug, Clone)]
pub struct LoopConfig {
    /// Delay between polls while nothing is pending.
    pub poll_interval: Duration,
    /// Delay after a resolved batch.
    pub cooldown: Duration,
    /// Termination policy.
    pub policy: LoopPolicy,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            cooldown: DEFAULT_COOLDOWN,
            policy: LoopPolicy::default(),
        }
    }
}

/// Counters tracked across loop iterations.
#[derive(Debug, Default)]
pub struct LoopState {
    /// Poll cycles run.
    pub cycles: u64,
    /// Batches resolved.
    pub batches: u64,
    /// Events whose code was resolved.
    pub resolved: u64,
    /// Events left unresolved.
    pub unresolved: u64,
    /// When the most recent poll ran.
    pub last_poll_at: Option<DateTime<Utc>>,
}

impl LoopState {
    /// Create a fresh state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_cycle(&mut self) {
        self.cycles += 1;
        self.last_poll_at = Some(Utc::now());
    }

    pub(crate) fn record_batch(&mut self, codes: &ResolvedCodes) {
        self.batches += 1;
        for code in codes.values() {
            if code.is_some() {
                self.resolved += 1;
            } else {
                self.unresolved += 1;
            }
        }
    }
}

/// What the loop produced before exiting.
#[derive(Debug, Default)]
pub struct LoopOutcome {
    /// Resolution results, accumulated across batches.
    pub codes: ResolvedCodes,
    /// Loop counters.
    pub state: LoopState,
}

/// Composes the poller and resolver into the monitoring loop.
#[derive(Debug)]
pub struct ReconciliationLoop {
    poller: EventPoller,
    resolver: CodeResolver,
    config: LoopConfig,
}

impl ReconciliationLoop {
    /// Build the loop from its collaborators.
    #[must_use]
    pub const fn new(poller: EventPoller, resolver: CodeResolver, config: LoopConfig) -> Self {
        Self {
            poller,
            resolver,
            config,
        }
    }

    /// Run until the policy's exit condition or Ctrl-C.
    pub async fn run(self) -> LoopOutcome {
        // Ctrl+C handler for clean shutdown.
        let (shutdown_tx, mut shutdown_rx) = tokio::sync::oneshot::channel();
        tokio::spawn(async move {
            let _ = tokio::signal::ctrl_c().await;
            let _ = shutdown_tx.send(());
        });

        let mut outcome = LoopOutcome::default();
        loop {
            outcome.state.record_cycle();
            let pending = self.poller.poll().await;

            if pending.is_empty() {
                debug!(
                    interval_secs = self.config.poll_interval.as_secs(),
                    "nothing pending, sleeping"
                );
                tokio::select! {
                    () = tokio::time::sleep(self.config.poll_interval) => continue,
                    _ = &mut shutdown_rx => break,
                }
            }

            info!(count = pending.len(), "pending roll calls found");
            let codes = self.resolver.resolve(&pending).await;
            outcome.state.record_batch(&codes);
            outcome.codes.extend(codes);

            match self.config.policy {
                LoopPolicy::OneShot => {
                    tokio::select! {
                        () = tokio::time::sleep(self.config.cooldown) => {}
                        _ = &mut shutdown_rx => {}
                    }
                    break;
                }
                LoopPolicy::Continuous => {
                    tokio::select! {
                        () = tokio::time::sleep(self.config.cooldown) => {}
                        _ = &mut shutdown_rx => break,
                    }
                }
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loop_config_defaults_match_service_cadence() {
        let config = LoopConfig::default();
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.cooldown, Duration::from_secs(200));
        assert_eq!(config.policy, LoopPolicy::OneShot);
    }

    #[test]
    fn record_batch_counts_resolved_and_unresolved() {
        let mut state = LoopState::new();
        let mut codes = ResolvedCodes::new();
        codes.insert("Algebra".to_string(), Some("3391".to_string()));
        codes.insert("History".to_string(), None);

        state.record_batch(&codes);

        assert_eq!(state.batches, 1);
        assert_eq!(state.resolved, 1);
        assert_eq!(state.unresolved, 1);
    }

    #[test]
    fn record_cycle_stamps_last_poll() {
        let mut state = LoopState::new();
        assert!(state.last_poll_at.is_none());

        state.record_cycle();

        assert_eq!(state.cycles, 1);
        assert!(state.last_poll_at.is_some());
    }
}
