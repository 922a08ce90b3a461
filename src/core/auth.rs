//! Login handshake against the SSO portal.
//!
//! Drives the CAS-style exchange: fetch the login page, extract the
//! handshake parameters, submit the encrypted credentials, classify the
//! outcome from the raw response. Redirects are never followed — a 3xx
//! status line *is* the success signal. Cookies set along the way stay in
//! the session's client and carry the authenticated state for every
//! subsequent request.

use std::fmt;

use reqwest::{Client, header};
use tracing::{debug, info};

use crate::core::cipher;
use crate::core::http;
use crate::core::page::{FieldExtractor, LoginForm};
use crate::error::{Result, RollwatchError};

/// Path of the login page and submission endpoint.
pub const LOGIN_PATH: &str = "/authserver/login";

/// Localized failure marker the portal embeds on bad credentials.
pub const CREDENTIAL_ERROR_MARKER: &str = "用户名或密码错误";

/// Error-message field name present on failure pages.
pub const ERROR_FIELD_MARKER: &str = "errorMessage";

/// How much of an unexpected response body to keep for diagnosis.
const AMBIGUOUS_SNIPPET_LEN: usize = 200;

/// A username/password pair. Never persisted; `Debug` redacts the
/// password.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Create a credential pair.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// The account name.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The plaintext password.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Login handshake states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No handshake attempted yet.
    #[default]
    Unauthenticated,
    /// Fetching the login page.
    FetchingPage,
    /// Submitting the encrypted credentials.
    Submitting,
    /// The portal accepted the credentials.
    Authenticated,
    /// The handshake failed; the session stays unusable.
    Failed,
}

/// An authenticated (or not-yet-authenticated) portal session.
///
/// Owns the HTTP client whose cookie store holds the session state. The
/// poller and resolver borrow the client; only the handshake mutates it.
#[derive(Debug)]
pub struct AuthSession {
    client: Client,
    base_url: String,
    state: SessionState,
}

impl AuthSession {
    /// Create an unauthenticated session against `base_url`.
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            state: SessionState::Unauthenticated,
        }
    }

    /// Current handshake state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the handshake has succeeded.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self.state, SessionState::Authenticated)
    }

    /// The HTTP client carrying the session cookies.
    #[must_use]
    pub const fn client(&self) -> &Client {
        &self.client
    }

    fn login_url(&self) -> String {
        format!("{}{LOGIN_PATH}", self.base_url)
    }

    /// Fetch the login page and extract the handshake parameters.
    async fn fetch_login_form(&mut self, extractor: &dyn FieldExtractor) -> Result<LoginForm> {
        self.state = SessionState::FetchingPage;
        let body = http::fetch_text(&self.client, &self.login_url()).await?;
        let form = LoginForm::from_document(extractor, &body)?;
        debug!(execution = %form.execution, "login form extracted");
        Ok(form)
    }

    /// Run the login handshake.
    ///
    /// # Errors
    ///
    /// - [`RollwatchError::PageParse`] when the login page lacks a
    ///   required field.
    /// - [`RollwatchError::AuthRejected`] when the portal flags the
    ///   credentials as wrong.
    /// - [`RollwatchError::AuthAmbiguous`] when the response is neither a
    ///   redirect nor a recognized failure page.
    /// - Network/timeout errors from either request.
    pub async fn login(
        &mut self,
        extractor: &dyn FieldExtractor,
        credentials: &Credentials,
    ) -> Result<()> {
        match self.run_handshake(extractor, credentials).await {
            Ok(()) => {
                self.state = SessionState::Authenticated;
                Ok(())
            }
            Err(e) => {
                self.state = SessionState::Failed;
                Err(e)
            }
        }
    }

    async fn run_handshake(
        &mut self,
        extractor: &dyn FieldExtractor,
        credentials: &Credentials,
    ) -> Result<()> {
        let form = self.fetch_login_form(extractor).await?;
        let password = cipher::encrypt_password(credentials.password(), &form.salt);

        self.state = SessionState::Submitting;
        let login_url = self.login_url();
        let response = self
            .client
            .post(&login_url)
            .header(header::REFERER, &login_url)
            .form(&[
                ("username", credentials.username()),
                ("password", password.as_str()),
                ("captcha", ""),
                ("_eventId", "submit"),
                ("lt", form.lt.as_str()),
                ("cllt", "userNameLogin"),
                ("dllt", "generalLogin"),
                ("execution", form.execution.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RollwatchError::Timeout(http::DEFAULT_TIMEOUT.as_secs())
                } else {
                    RollwatchError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_redirection() {
            let location = response
                .headers()
                .get(header::LOCATION)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default();
            info!(status = status.as_u16(), location, "login accepted");
            return Ok(());
        }

        let body = response
            .text()
            .await
            .map_err(|e| RollwatchError::Network(e.to_string()))?;
        if body.contains(CREDENTIAL_ERROR_MARKER) || body.contains(ERROR_FIELD_MARKER) {
            return Err(RollwatchError::AuthRejected);
        }

        Err(RollwatchError::AuthAmbiguous {
            status: status.as_u16(),
            snippet: snippet(&body),
        })
    }
}

/// First [`AMBIGUOUS_SNIPPET_LEN`] characters of `body`, on a char
/// boundary.
fn snippet(body: &str) -> String {
    body.chars().take(AMBIGUOUS_SNIPPET_LEN).collect()
}
