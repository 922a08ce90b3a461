//! Error types for rollwatch.
//!
//! Uses `thiserror` for structured error types that map to exit codes.
//!
//! ## Error Taxonomy
//!
//! Errors are categorized into five main categories:
//! - **Authentication**: Login handshake failures (rejected credentials,
//!   ambiguous portal responses, unusable login page)
//! - **Network**: Connection, timeout, DNS, or SSL/TLS issues
//! - **Configuration**: Config file parsing, validation, or missing values
//! - **Service**: Attendance-service API errors and malformed payloads
//! - **Internal**: Unexpected errors, bugs, or unclassified issues
//!
//! Each error has a stable error code (e.g., `RW-A001`) for programmatic
//! handling.
//!
//! ## Propagation policy
//!
//! Failures at the login stage are terminal for the run. Failures during
//! polling and code resolution are absorbed where they occur (per cycle or
//! per event) and logged; they never surface as one of these variants from
//! the reconciliation loop.

use thiserror::Error;

// =============================================================================
// Error Categories
// =============================================================================

/// High-level error categories for classification and routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Login handshake failures.
    Authentication,
    /// Network issues (timeout, DNS, SSL, connection refused).
    Network,
    /// Configuration issues (parse errors, invalid values, missing files).
    Configuration,
    /// Attendance-service API issues.
    Service,
    /// Internal errors (bugs, unexpected state, unclassified).
    Internal,
}

impl ErrorCategory {
    /// Returns a human-readable description of the category.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Authentication => "Authentication error",
            Self::Network => "Network error",
            Self::Configuration => "Configuration error",
            Self::Service => "Service error",
            Self::Internal => "Internal error",
        }
    }

    /// Returns a short code prefix for this category.
    #[must_use]
    pub const fn code_prefix(&self) -> &'static str {
        match self {
            Self::Authentication => "A",
            Self::Network => "N",
            Self::Configuration => "C",
            Self::Service => "S",
            Self::Internal => "X",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

// =============================================================================
// Exit Codes
// =============================================================================

/// Stable process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// Unexpected failure
    GeneralError = 1,
    /// Login handshake failed
    AuthFailure = 2,
    /// Configuration or parse errors
    ConfigError = 3,
    /// Timeout
    Timeout = 4,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

/// Main error type for rollwatch operations.
///
/// Each variant has:
/// - A stable error code (e.g., `RW-A001`)
/// - A category for classification
/// - A retryable flag for retry logic
#[derive(Error, Debug)]
pub enum RollwatchError {
    // ==========================================================================
    // Authentication errors (Category: Authentication)
    // ==========================================================================
    /// The portal rejected the submitted credentials.
    #[error("login rejected: wrong username or password")]
    AuthRejected,

    /// The portal answered the login submission with something that is
    /// neither a redirect nor a recognized failure page.
    #[error("login outcome ambiguous (HTTP {status}): {snippet}")]
    AuthAmbiguous { status: u16, snippet: String },

    /// The login page did not carry a required hidden field.
    #[error("login page missing required field: {field}")]
    PageParse { field: String },

    /// An operation requiring an authenticated session was attempted
    /// before login succeeded.
    #[error("session is not authenticated")]
    NotAuthenticated,

    // ==========================================================================
    // Network errors (Category: Network)
    // ==========================================================================
    /// Request timed out after the specified duration.
    #[error("request timeout after {0} seconds")]
    Timeout(u64),

    /// Generic network error.
    #[error("network error: {0}")]
    Network(String),

    // ==========================================================================
    // Service errors (Category: Service)
    // ==========================================================================
    /// The attendance service returned a non-success status.
    #[error("service returned HTTP {status} from {url}")]
    ServiceApi { status: u16, url: String },

    /// Failed to parse a service response body.
    #[error("failed to parse response: {0}")]
    ParseResponse(String),

    // ==========================================================================
    // Configuration errors (Category: Configuration)
    // ==========================================================================
    /// Configuration file not found at the expected path.
    #[error("config file not found: {path}")]
    ConfigNotFound { path: String },

    /// Error parsing the configuration file.
    #[error("config parse error at {path}: {message}")]
    ConfigParse { path: String, message: String },

    /// A required credential is missing from config and environment.
    #[error("missing credential '{key}' (set it in the config file or {env})")]
    MissingCredential { key: &'static str, env: &'static str },

    /// An invalid command-line argument value.
    #[error("invalid value for {flag}: {message}")]
    InvalidArgument { flag: String, message: String },

    // ==========================================================================
    // I/O errors (Category: Internal)
    // ==========================================================================
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ==========================================================================
    // Generic wrapper (Category: Internal)
    // ==========================================================================
    /// Catch-all for other errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RollwatchError {
    /// Map error to a stable process exit code.
    #[must_use]
    pub const fn exit_code(&self) -> ExitCode {
        match self {
            Self::AuthRejected
            | Self::AuthAmbiguous { .. }
            | Self::PageParse { .. }
            | Self::NotAuthenticated => ExitCode::AuthFailure,

            Self::ConfigNotFound { .. }
            | Self::ConfigParse { .. }
            | Self::MissingCredential { .. }
            | Self::InvalidArgument { .. }
            | Self::ParseResponse(_) => ExitCode::ConfigError,

            Self::Timeout(_) => ExitCode::Timeout,

            Self::Network(_)
            | Self::ServiceApi { .. }
            | Self::Io(_)
            | Self::Json(_)
            | Self::Other(_) => ExitCode::GeneralError,
        }
    }

    /// Returns the error category for classification and routing.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::AuthRejected
            | Self::AuthAmbiguous { .. }
            | Self::PageParse { .. }
            | Self::NotAuthenticated => ErrorCategory::Authentication,

            Self::Timeout(_) | Self::Network(_) => ErrorCategory::Network,

            Self::ConfigNotFound { .. }
            | Self::ConfigParse { .. }
            | Self::MissingCredential { .. }
            | Self::InvalidArgument { .. } => ErrorCategory::Configuration,

            Self::ServiceApi { .. } | Self::ParseResponse(_) => ErrorCategory::Service,

            Self::Io(_) | Self::Json(_) | Self::Other(_) => ErrorCategory::Internal,
        }
    }

    /// Returns a stable error code for programmatic handling.
    ///
    /// Format: `RW-{category}{number}` where category is:
    /// - A: Authentication
    /// - N: Network
    /// - C: Configuration
    /// - S: Service
    /// - X: Internal
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            // Authentication errors (A001-A099)
            Self::AuthRejected => "RW-A001",
            Self::AuthAmbiguous { .. } => "RW-A002",
            Self::PageParse { .. } => "RW-A003",
            Self::NotAuthenticated => "RW-A004",

            // Network errors (N001-N099)
            Self::Timeout(_) => "RW-N001",
            Self::Network(_) => "RW-N099",

            // Configuration errors (C001-C099)
            Self::ConfigNotFound { .. } => "RW-C001",
            Self::ConfigParse { .. } => "RW-C002",
            Self::MissingCredential { .. } => "RW-C003",
            Self::InvalidArgument { .. } => "RW-C004",

            // Service errors (S001-S099)
            Self::ServiceApi { .. } => "RW-S001",
            Self::ParseResponse(_) => "RW-S020",

            // Internal errors (X001-X099)
            Self::Io(_) => "RW-X001",
            Self::Json(_) => "RW-X002",
            Self::Other(_) => "RW-X099",
        }
    }

    /// Returns whether the error is potentially recoverable by retrying.
    ///
    /// Retryable errors include timeouts, transient network errors, and
    /// service-side HTTP failures. Credential and configuration errors are
    /// never retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_) | Self::Network(_) | Self::ServiceApi { .. }
        )
    }
}

/// Result type alias for rollwatch operations.
pub type Result<T> = std::result::Result<T, RollwatchError>;

// =============================================================================
// Tests
// =============================================================================
