//! HTTP client utilities.
//!
//! Provides the shared HTTP client used for the login handshake and all
//! attendance-service requests. The client keeps a cookie store (the
//! authenticated session lives in the cookies set during login) and never
//! follows redirects, because the login handshake classifies its outcome
//! from the raw status line.

use std::time::Duration;

use reqwest::{Client, ClientBuilder, redirect};

use crate::error::{Result, RollwatchError};

/// Default timeout for HTTP requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default User-Agent, imitating a mobile browser the portal accepts.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 6.0; Nexus 5 Build/MRA58N) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/139.0.0.0 Mobile Safari/537.36";

/// Build a configured HTTP client.
///
/// # Errors
///
/// Returns error if client construction fails.
pub fn build_client(user_agent: &str, timeout: Duration) -> Result<Client> {
    ClientBuilder::new()
        .timeout(timeout)
        .user_agent(user_agent)
        .cookie_store(true)
        .redirect(redirect::Policy::none())
        .build()
        .map_err(|e| RollwatchError::Network(e.to_string()))
}

/// Fetch JSON from a URL.
///
/// # Errors
///
/// Returns error on network failure, non-success status, or JSON parse
/// failure.
pub async fn fetch_json<T: serde::de::DeserializeOwned>(client: &Client, url: &str) -> Result<T> {
    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            RollwatchError::Timeout(DEFAULT_TIMEOUT.as_secs())
        } else {
            RollwatchError::Network(e.to_string())
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(RollwatchError::ServiceApi {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    response
        .json()
        .await
        .map_err(|e| RollwatchError::ParseResponse(e.to_string()))
}

/// Fetch a text body from a URL.
///
/// # Errors
///
/// Returns error on network failure or non-success status.
pub async fn fetch_text(client: &Client, url: &str) -> Result<String> {
    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            RollwatchError::Timeout(DEFAULT_TIMEOUT.as_secs())
        } else {
            RollwatchError::Network(e.to_string())
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(RollwatchError::ServiceApi {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    response
        .text()
        .await
        .map_err(|e| RollwatchError::Network(e.to_string()))
}
