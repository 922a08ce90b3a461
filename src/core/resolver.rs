//! Answer-code resolution for pending roll calls.
//!
//! Fetches the per-student resource of each pending event and extracts
//! the short code used to answer it. Events resolve one at a time, in
//! pending-set order, and a failure on one never blocks the others.

use std::collections::BTreeMap;

use reqwest::Client;
use serde::Deserialize;
use tracing::{info, warn};

use crate::core::auth::AuthSession;
use crate::core::http;
use crate::core::poller::PendingSet;
use crate::error::{Result, RollwatchError};

/// Resolution results, one entry per pending event. `None` marks an
/// event whose code could not be resolved.
pub type ResolvedCodes = BTreeMap<String, Option<String>>;

/// The code field arrives as a string or a bare number depending on the
/// service version.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CodeValue {
    Text(String),
    Number(u64),
}

impl CodeValue {
    fn into_string(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Number(number) => number.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct StudentRollCallsResponse {
    #[serde(default)]
    number_code: Option<CodeValue>,
}

/// Resolves answer codes over a session's authenticated transport.
#[derive(Debug)]
pub struct CodeResolver {
    client: Client,
    base_url: String,
}

impl CodeResolver {
    /// Build a resolver reusing `session`'s authenticated transport.
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

    fn event_url(&self, id: u64) -> String {
        format!("{}/api/rollcall/{id}/student_rollcalls", self.base_url)
    }

    /// Resolve the code of a single event.
    ///
    /// Returns `None` on any failure — transport, decode, or a response
    /// without a usable code — after logging it.
    pub async fn resolve_one(&self, id: u64) -> Option<String> {
        match http::fetch_json::<StudentRollCallsResponse>(&self.client, &self.event_url(id)).await
        {
            Ok(response) => response
                .number_code
                .map(CodeValue::into_string)
                .filter(|code| !code.is_empty()),
            Err(e) => {
                warn!(id, "code lookup failed: {e}");
                None
            }
        }
    }

    /// Resolve every event in `pending`, one entry per input key.
    ///
    /// Per-event isolation: a failure for one event marks only that entry
    /// unresolved and resolution of the siblings continues.
    pub async fn resolve(&self, pending: &PendingSet) -> ResolvedCodes {
        let mut codes = ResolvedCodes::new();
        for (title, &id) in pending {
            let code = self.resolve_one(id).await;
            match &code {
                Some(code) => info!(course = %title, code, "answer code resolved"),
                None => warn!(course = %title, id, "answer code unresolved"),
            }
            codes.insert(title.clone(), code);
        }
        codes
    }
}
