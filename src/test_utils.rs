//! Shared test fixtures.
//!
//! Included in test builds or when the `test-utils` feature is enabled,
//! so integration tests can build realistic portal pages and service
//! payloads without duplicating markup.

use serde_json::json;

/// A login page carrying the handshake hidden fields.
///
/// `lt` is omitted from the markup when `None`, mirroring portals that no
/// longer issue the legacy token.
#[must_use]
pub fn login_page_html(salt: &str, execution: &str, lt: Option<&str>) -> String {
    let lt_input = lt
        .map(|value| format!(r#"  <input type="hidden" name="lt" value="{value}">"#))
        .unwrap_or_default();
    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Unified Identity Authentication</title></head>
<body>
<form id="pwdFromId" action="/authserver/login" method="post">
  <input type="text" name="username" placeholder="Username">
  <input type="password" name="password" placeholder="Password">
  <input type="hidden" id="pwdEncryptSalt" value="{salt}">
  <input type="hidden" name="execution" value="{execution}">
{lt_input}
  <input type="hidden" name="_eventId" value="submit">
</form>
</body>
</html>"#
    )
}

/// One radar roll-call entry as a JSON value. `id: None` drops the
/// `rollcall_id` field entirely.
#[must_use]
pub fn rollcall_event_json(
    id: Option<u64>,
    title: &str,
    rollcall_status: &str,
    status: &str,
    is_expired: bool,
) -> serde_json::Value {
    let mut event = json!({
        "course_title": title,
        "rollcall_status": rollcall_status,
        "status": status,
        "is_expired": is_expired,
    });
    if let Some(id) = id {
        event["rollcall_id"] = json!(id);
    }
    event
}

/// A radar response wrapping the given events.
#[must_use]
pub fn rollcalls_response_json(events: Vec<serde_json::Value>) -> serde_json::Value {
    json!({ "rollcalls": events })
}

/// A credentials config file on disk; lives as long as the returned
/// handle.
#[must_use]
pub fn temp_config(contents: &str) -> tempfile::NamedTempFile {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().expect("temp config file");
    file.write_all(contents.as_bytes()).expect("write temp config");
    file
}
