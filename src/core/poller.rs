//! Roll-call event polling.
//!
//! Queries the attendance service's radar endpoint and classifies which
//! events still need an answer. A cycle never fails: transport and decode
//! problems are logged and reported as "nothing pending", keeping the
//! reconciliation loop alive.

use std::collections::BTreeMap;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::core::auth::AuthSession;
use crate::core::http;
use crate::error::{Result, RollwatchError};

/// Radar endpoint listing the student's roll calls.
pub const ROLLCALLS_PATH: &str = "/api/radar/rollcalls?api_version=1.1.0";

/// Roll-call state meaning the check is currently open.
pub const STATUS_IN_PROGRESS: &str = "in_progress";

/// Student state meaning the check has not been answered yet.
pub const STUDENT_ABSENT: &str = "absent";

/// One roll-call event as reported by the radar endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RollCallEvent {
    /// Event id; events without one cannot be answered and are skipped.
    #[serde(default)]
    pub rollcall_id: Option<u64>,
    /// Course the roll call belongs to.
    #[serde(default)]
    pub course_title: String,
    /// Roll-call state (`in_progress` or anything else).
    #[serde(default)]
    pub rollcall_status: String,
    /// The student's own state (`absent`, `present`, ...).
    #[serde(default)]
    pub status: String,
    /// Whether the answer window has closed. A missing field counts as
    /// expired.
    #[serde(default = "default_expired")]
    pub is_expired: bool,
}

const fn default_expired() -> bool {
    true
}

impl RollCallEvent {
    /// Whether this event still needs an answer: the check is open, the
    /// student is recorded absent, and the window has not closed.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.rollcall_status == STATUS_IN_PROGRESS
            && self.status == STUDENT_ABSENT
            && !self.is_expired
    }
}

#[derive(Debug, Default, Deserialize)]
struct RollCallsResponse {
    #[serde(default)]
    rollcalls: Vec<RollCallEvent>,
}

/// Pending events, keyed by course title. Two simultaneous events sharing
/// a title collide; the later one wins.
pub type PendingSet = BTreeMap<String, u64>;

/// Apply the pending filter to a batch of events.
#[must_use]
pub fn pending_events(events: &[RollCallEvent]) -> PendingSet {
    let mut pending = PendingSet::new();
    for event in events {
        if !event.is_pending() {
            continue;
        }
        let Some(id) = event.rollcall_id else {
            debug!(course = %event.course_title, "pending roll call without id, skipped");
            continue;
        };
        pending.insert(event.course_title.clone(), id);
    }
    pending
}

/// Polls the attendance service for pending roll calls.
#[derive(Debug)]
pub struct EventPoller {
    client: Client,
    base_url: String,
}

impl EventPoller {
    /// Build a poller reusing `session`'s authenticated transport.
    ///
    /// # Errors
    ///
    /// Returns [`RollwatchError::NotAuthenticated`] when the session has
    /// not completed the login handshake.
    pub fn for_session(session: &AuthSession, events_base_url: &str) -> Result<Self> {
        if !session.is_authenticated() {
            return Err(RollwatchError::NotAuthenticated);
        }
        Ok(Self {
            client: session.client().clone(),
            base_url: events_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Query the radar endpoint and return the pending set.
    ///
    /// Never fails: transport errors, non-success statuses, and malformed
    /// payloads are logged and yield an empty set for this cycle.
    pub async fn poll(&self) -> PendingSet {
        let url = format!("{}{ROLLCALLS_PATH}", self.base_url);
        match http::fetch_json::<RollCallsResponse>(&self.client, &url).await {
            Ok(response) => {
                let pending = pending_events(&response.rollcalls);
                if pending.is_empty() {
                    debug!(total = response.rollcalls.len(), "no pending roll calls");
                }
                pending
            }
            Err(e) => {
                warn!("roll-call poll failed, treating as empty: {e}");
                PendingSet::new()
            }
        }
    }
}
