//! Retry classification for errors surfaced by the GraphQL transport.
//!
//! A non-2xx GraphQL response is reported as `returned error NNN: <body>`.
//! The status code is recovered from that text, so every caller that needs a
//! retry decision goes through [`classify`]. If the transport ever exposes a
//! structured status, this is the only place that has to change.

use std::sync::LazyLock;

use regex_lite::Regex;

static STATUS_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"returned error (\d{3}):").ok());

/// Retry decision derived from an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// HTTP 429: retry after backoff.
    RateLimited,
    /// HTTP 502, 503 or 504: retry after backoff.
    ServerError,
    /// Anything else, including errors without an embedded status.
    Fatal,
}

impl ErrorClass {
    /// Returns true if the caller may re-issue the operation.
    pub fn is_retryable(self) -> bool {
        !matches!(self, ErrorClass::Fatal)
    }

    /// Classify a bare HTTP status code.
    pub fn from_status(status: u16) -> Self {
        match status {
            429 => ErrorClass::RateLimited,
            502..=504 => ErrorClass::ServerError,
            _ => ErrorClass::Fatal,
        }
    }
}

/// Extract the three-digit status embedded as `returned error NNN:`.
///
/// Returns `None` when the pattern is absent or the digits do not parse.
pub fn status_code(message: &str) -> Option<u16> {
    let pattern = STATUS_PATTERN.as_ref()?;
    let captures = pattern.captures(message)?;
    captures.get(1)?.as_str().parse().ok()
}

/// Classify an error message.
pub fn classify_message(message: &str) -> ErrorClass {
    status_code(message).map_or(ErrorClass::Fatal, ErrorClass::from_status)
}

/// Classify any error by its display text.
pub fn classify<E: std::error::Error + ?Sized>(err: &E) -> ErrorClass {
    classify_message(&err.to_string())
}

/// Returns true if the error is a rate limit or an upstream server error.
pub fn is_retryable_error<E: std::error::Error + ?Sized>(err: &E) -> bool {
    classify(err).is_retryable()
}

/// Returns true if the error reports HTTP 429.
pub fn is_rate_limited<E: std::error::Error + ?Sized>(err: &E) -> bool {
    classify(err) == ErrorClass::RateLimited
}

/// Returns true if the error reports HTTP 502-504.
pub fn is_server_error<E: std::error::Error + ?Sized>(err: &E) -> bool {
    classify(err) == ErrorClass::ServerError
}
