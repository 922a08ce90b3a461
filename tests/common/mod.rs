//! Shared helpers for integration tests.

#![allow(dead_code)]

pub mod logger;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use rollwatch::core::auth::{AuthSession, Credentials};
use rollwatch::core::http::{DEFAULT_TIMEOUT, build_client};
use rollwatch::core::page::RegexExtractor;
use rollwatch::test_utils::login_page_html;

/// Salt used by the mock portal (16 bytes, AES-128).
pub const TEST_SALT: &str = "iEnaZo5rTmKcQi2M";

/// Execution token used by the mock portal.
pub const TEST_EXECUTION: &str = "e1s1";

/// Mount a login page and an accepting submission endpoint.
pub async fn mount_login_success(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/authserver/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(login_page_html(TEST_SALT, TEST_EXECUTION, None)),
        )
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/authserver/login"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("Location", "/authserver/index.do"),
        )
        .mount(server)
        .await;
}

/// Build a session against the mock server and run the handshake.
pub async fn authenticated_session(server: &MockServer) -> AuthSession {
    let client = build_client("rollwatch-tests/1.0", DEFAULT_TIMEOUT).expect("client builds");
    let mut session = AuthSession::new(client, server.uri());
    let extractor = RegexExtractor::new();
    let credentials = Credentials::new("student1", "hunter2");
    session
        .login(&extractor, &credentials)
        .await
        .expect("handshake succeeds");
    session
}
