//! Integration tests for polling, code resolution, and the
//! reconciliation loop against a mock attendance service.

mod common;

use std::time::Duration;

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use rollwatch::core::poller::EventPoller;
use rollwatch::core::reconcile::{LoopConfig, LoopPolicy, ReconciliationLoop};
use rollwatch::core::resolver::CodeResolver;
use rollwatch::test_utils::{rollcall_event_json, rollcalls_response_json};

use common::logger::TestLogger;
use common::{authenticated_session, mount_login_success};

// =============================================================================
// Poller
// =============================================================================

#[tokio::test]
async fn poll_filters_and_maps_title_to_id() {
    let log = TestLogger::new("poll_filters_and_maps_title_to_id");
    log.phase("setup");

    let server = MockServer::start().await;
    mount_login_success(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/radar/rollcalls"))
        .and(query_param("api_version", "1.1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rollcalls_response_json(vec![
            rollcall_event_json(Some(141_798), "Algebra", "in_progress", "absent", false),
            rollcall_event_json(Some(141_799), "History", "in_progress", "present", false),
            rollcall_event_json(Some(141_800), "Physics", "in_progress", "absent", true),
            rollcall_event_json(Some(141_801), "Chemistry", "ended", "absent", false),
            rollcall_event_json(None, "Biology", "in_progress", "absent", false),
        ])))
        .mount(&server)
        .await;

    log.phase("execute");
    let session = authenticated_session(&server).await;
    let poller = EventPoller::for_session(&session, &server.uri()).expect("poller builds");
    let pending = poller.poll().await;

    log.phase("verify");
    assert_eq!(pending.len(), 1);
    assert_eq!(pending.get("Algebra"), Some(&141_798));
    log.finish_ok();
}

#[tokio::test]
async fn poll_transport_failure_yields_empty_set() {
    let log = TestLogger::new("poll_transport_failure_yields_empty_set");
    log.phase("setup");

    let server = MockServer::start().await;
    mount_login_success(&server).await;
    // No radar mock mounted: the endpoint 404s.

    log.phase("execute");
    let session = authenticated_session(&server).await;
    let poller = EventPoller::for_session(&session, &server.uri()).expect("poller builds");
    let pending = poller.poll().await;

    log.phase("verify");
    assert!(pending.is_empty());
    log.finish_ok();
}

#[tokio::test]
async fn poll_malformed_payload_yields_empty_set() {
    let log = TestLogger::new("poll_malformed_payload_yields_empty_set");
    log.phase("setup");

    let server = MockServer::start().await;
    mount_login_success(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/radar/rollcalls"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not valid json"))
        .mount(&server)
        .await;

    log.phase("execute");
    let session = authenticated_session(&server).await;
    let poller = EventPoller::for_session(&session, &server.uri()).expect("poller builds");
    let pending = poller.poll().await;

    log.phase("verify");
    assert!(pending.is_empty());
    log.finish_ok();
}

// =============================================================================
// Resolver
// =============================================================================

#[tokio::test]
async fn resolve_returns_codes_for_pending_events() {
    let log = TestLogger::new("resolve_returns_codes_for_pending_events");
    log.phase("setup");

    let server = MockServer::start().await;
    mount_login_success(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/rollcall/141798/student_rollcalls"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"number_code": "3391"})),
        )
        .mount(&server)
        .await;

    log.phase("execute");
    let session = authenticated_session(&server).await;
    let resolver = CodeResolver::for_session(&session, &server.uri()).expect("resolver builds");
    let mut pending = rollwatch::core::poller::PendingSet::new();
    pending.insert("Algebra".to_string(), 141_798);
    let codes = resolver.resolve(&pending).await;

    log.phase("verify");
    assert_eq!(codes.len(), 1);
    assert_eq!(codes.get("Algebra"), Some(&Some("3391".to_string())));
    log.finish_ok();
}

#[tokio::test]
async fn resolve_isolates_per_event_failures() {
    let log = TestLogger::new("resolve_isolates_per_event_failures");
    log.phase("setup");

    let server = MockServer::start().await;
    mount_login_success(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/rollcall/141798/student_rollcalls"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"number_code": "3391"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/rollcall/141799/student_rollcalls"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not valid json"))
        .mount(&server)
        .await;

    log.phase("execute");
    let session = authenticated_session(&server).await;
    let resolver = CodeResolver::for_session(&session, &server.uri()).expect("resolver builds");
    let mut pending = rollwatch::core::poller::PendingSet::new();
    pending.insert("Algebra".to_string(), 141_798);
    pending.insert("History".to_string(), 141_799);
    let codes = resolver.resolve(&pending).await;

    log.phase("verify");
    assert_eq!(codes.len(), 2, "one entry per input key");
    assert_eq!(codes.get("Algebra"), Some(&Some("3391".to_string())));
    assert_eq!(codes.get("History"), Some(&None));
    log.finish_ok();
}

#[tokio::test]
async fn resolve_one_accepts_numeric_codes() {
    let log = TestLogger::new("resolve_one_accepts_numeric_codes");
    log.phase("setup");

    let server = MockServer::start().await;
    mount_login_success(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/rollcall/7/student_rollcalls"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"number_code": 3391})),
        )
        .mount(&server)
        .await;

    log.phase("execute");
    let session = authenticated_session(&server).await;
    let resolver = CodeResolver::for_session(&session, &server.uri()).expect("resolver builds");
    let code = resolver.resolve_one(7).await;

    log.phase("verify");
    assert_eq!(code, Some("3391".to_string()));
    log.finish_ok();
}

#[tokio::test]
async fn resolve_one_treats_missing_code_as_unresolved() {
    let log = TestLogger::new("resolve_one_treats_missing_code_as_unresolved");
    log.phase("setup");

    let server = MockServer::start().await;
    mount_login_success(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/rollcall/8/student_rollcalls"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    log.phase("execute");
    let session = authenticated_session(&server).await;
    let resolver = CodeResolver::for_session(&session, &server.uri()).expect("resolver builds");
    let code = resolver.resolve_one(8).await;

    log.phase("verify");
    assert_eq!(code, None);
    log.finish_ok();
}

// =============================================================================
// Reconciliation Loop
// =============================================================================

#[tokio::test]
async fn loop_resolves_first_batch_and_exits() {
    let log = TestLogger::new("loop_resolves_first_batch_and_exits");
    log.phase("setup");

    let server = MockServer::start().await;
    mount_login_success(&server).await;

    // First poll finds nothing; the loop must retry and then resolve.
    Mock::given(method("GET"))
        .and(path("/api/radar/rollcalls"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(rollcalls_response_json(Vec::new())),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/radar/rollcalls"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rollcalls_response_json(vec![
            rollcall_event_json(Some(141_798), "Algebra", "in_progress", "absent", false),
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/rollcall/141798/student_rollcalls"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"number_code": "3391"})),
        )
        .mount(&server)
        .await;

    log.phase("execute");
    let session = authenticated_session(&server).await;
    let poller = EventPoller::for_session(&session, &server.uri()).expect("poller builds");
    let resolver = CodeResolver::for_session(&session, &server.uri()).expect("resolver builds");
    let config = LoopConfig {
        poll_interval: Duration::from_millis(20),
        cooldown: Duration::from_millis(10),
        policy: LoopPolicy::OneShot,
    };
    let outcome = ReconciliationLoop::new(poller, resolver, config).run().await;

    log.phase("verify");
    assert_eq!(outcome.codes.get("Algebra"), Some(&Some("3391".to_string())));
    assert_eq!(outcome.state.cycles, 2, "empty poll, then the batch");
    assert_eq!(outcome.state.batches, 1);
    assert_eq!(outcome.state.resolved, 1);
    assert_eq!(outcome.state.unresolved, 0);
    assert!(outcome.state.last_poll_at.is_some());
    log.finish_ok();
}

#[tokio::test]
async fn loop_survives_poll_failures() {
    let log = TestLogger::new("loop_survives_poll_failures");
    log.phase("setup");

    let server = MockServer::start().await;
    mount_login_success(&server).await;

    // First poll hits a server error; the cycle is absorbed, not fatal.
    Mock::given(method("GET"))
        .and(path("/api/radar/rollcalls"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/radar/rollcalls"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rollcalls_response_json(vec![
            rollcall_event_json(Some(9), "Algebra", "in_progress", "absent", false),
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/rollcall/9/student_rollcalls"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"number_code": "1200"})),
        )
        .mount(&server)
        .await;

    log.phase("execute");
    let session = authenticated_session(&server).await;
    let poller = EventPoller::for_session(&session, &server.uri()).expect("poller builds");
    let resolver = CodeResolver::for_session(&session, &server.uri()).expect("resolver builds");
    let config = LoopConfig {
        poll_interval: Duration::from_millis(20),
        cooldown: Duration::from_millis(10),
        policy: LoopPolicy::OneShot,
    };
    let outcome = ReconciliationLoop::new(poller, resolver, config).run().await;

    log.phase("verify");
    assert_eq!(outcome.codes.get("Algebra"), Some(&Some("1200".to_string())));
    assert_eq!(outcome.state.cycles, 2);
    log.finish_ok();
}

#[tokio::test]
async fn loop_records_unresolved_entries() {
    let log = TestLogger::new("loop_records_unresolved_entries");
    log.phase("setup");

    let server = MockServer::start().await;
    mount_login_success(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/radar/rollcalls"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rollcalls_response_json(vec![
            rollcall_event_json(Some(1), "Algebra", "in_progress", "absent", false),
            rollcall_event_json(Some(2), "History", "in_progress", "absent", false),
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/rollcall/1/student_rollcalls"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"number_code": "4242"})),
        )
        .mount(&server)
        .await;
    // Event 2's endpoint 404s: that entry stays unresolved.

    log.phase("execute");
    let session = authenticated_session(&server).await;
    let poller = EventPoller::for_session(&session, &server.uri()).expect("poller builds");
    let resolver = CodeResolver::for_session(&session, &server.uri()).expect("resolver builds");
    let config = LoopConfig {
        poll_interval: Duration::from_millis(20),
        cooldown: Duration::from_millis(10),
        policy: LoopPolicy::OneShot,
    };
    let outcome = ReconciliationLoop::new(poller, resolver, config).run().await;

    log.phase("verify");
    assert_eq!(outcome.codes.get("Algebra"), Some(&Some("4242".to_string())));
    assert_eq!(outcome.codes.get("History"), Some(&None));
    assert_eq!(outcome.state.resolved, 1);
    assert_eq!(outcome.state.unresolved, 1);
    log.finish_ok();
}
