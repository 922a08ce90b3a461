//! Minimal structured test logger: phase markers, per-test duration,
//! level gated by the `TEST_LOG_LEVEL` env var (debug lines hidden
//! unless it says `debug` or `trace`).

#![allow(dead_code)]

use std::time::Instant;

/// Structured logging for one test's lifetime.
pub struct TestLogger {
    name: String,
    started: Instant,
    debug_enabled: bool,
}

impl TestLogger {
    /// Start logging for the named test.
    #[must_use]
    pub fn new(name: &str) -> Self {
        let debug_enabled = std::env::var("TEST_LOG_LEVEL")
            .map(|level| matches!(level.to_lowercase().as_str(), "debug" | "trace"))
            .unwrap_or(false);
        eprintln!("[{name}] start");
        Self {
            name: name.to_string(),
            started: Instant::now(),
            debug_enabled,
        }
    }

    /// Mark a test phase (setup, execute, verify, ...).
    pub fn phase(&self, phase: &str) {
        eprintln!("[{}] phase: {phase}", self.name);
    }

    /// Log an informational message.
    pub fn info(&self, message: &str) {
        eprintln!("[{}] {message}", self.name);
    }

    /// Log a debug message (only with TEST_LOG_LEVEL=debug/trace).
    pub fn debug(&self, message: &str) {
        if self.debug_enabled {
            eprintln!("[{}] debug: {message}", self.name);
        }
    }

    /// Log an outgoing HTTP request.
    pub fn http_request(&self, method: &str, url: &str) {
        self.debug(&format!("{method} {url}"));
    }

    /// Mark the test as finished successfully.
    pub fn finish_ok(&self) {
        eprintln!("[{}] ok in {:?}", self.name, self.started.elapsed());
    }
}
