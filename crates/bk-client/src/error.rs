//! Error types for buildkite-client.

use crate::classify::{self, ErrorClass};

/// Result type alias for buildkite-client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for buildkite-client operations.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional source error.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Create a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// Create a new error with the given kind and source.
    pub fn with_source(
        kind: ErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
        }
    }

    /// Retry classification of this error, derived from its message text.
    pub fn classification(&self) -> ErrorClass {
        classify::classify(self)
    }

    /// Returns true if a caller may re-issue the operation after backoff.
    pub fn is_retryable(&self) -> bool {
        self.classification().is_retryable()
    }

    /// Returns true if the remote API rate limited the request.
    pub fn is_rate_limited(&self) -> bool {
        self.classification() == ErrorClass::RateLimited
    }

    /// Returns the HTTP status code carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match &self.kind {
            ErrorKind::RestStatus { status, .. } | ErrorKind::GraphqlStatus { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// Request payload could not be encoded as JSON.
    #[error("failed to marshal request: {0}")]
    Serialization(String),

    /// Request could not be built (bad URL or method).
    #[error("failed to create request: {0}")]
    InvalidUrl(String),

    /// Network-level failure while sending.
    #[error("failed to send request: {0}")]
    Connection(String),

    /// Request timed out in the transport.
    #[error("failed to send request: timed out")]
    Timeout,

    /// REST call answered with status >= 400.
    #[error("Buildkite API request failed: {method} {url} (status: {status})")]
    RestStatus {
        method: String,
        url: String,
        status: u16,
    },

    /// GraphQL endpoint answered with a non-2xx status.
    #[error("returned error {status}: {body}")]
    GraphqlStatus { status: u16, body: String },

    /// GraphQL-level errors returned with a successful HTTP status.
    #[error("GraphQL errors: {}", .messages.join("; "))]
    Graphql { messages: Vec<String> },

    /// GraphQL response violated the protocol (e.g. no data and no errors).
    #[error("GraphQL protocol error: {0}")]
    Protocol(String),

    /// Response body could not be read.
    #[error("failed to read response: {0}")]
    Read(String),

    /// Response body was not the expected JSON.
    #[error("failed to unmarshal response: {0}")]
    Json(String),

    /// The organization slug did not resolve to an organization.
    #[error("organization not found: {0}")]
    OrganizationNotFound(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// All retries exhausted.
    #[error("All {attempts} retry attempts exhausted")]
    RetriesExhausted { attempts: u32 },

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            ErrorKind::Timeout
        } else if err.is_connect() || err.is_request() {
            ErrorKind::Connection(err.to_string())
        } else if err.is_body() || err.is_decode() {
            ErrorKind::Read(err.to_string())
        } else {
            ErrorKind::Other(err.to_string())
        };

        Error::with_source(kind, err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::with_source(ErrorKind::Json(err.to_string()), err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::with_source(ErrorKind::InvalidUrl(err.to_string()), err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graphql_status_is_classified() {
        let err = Error::new(ErrorKind::GraphqlStatus {
            status: 429,
            body: "slow down".into(),
        });
        assert!(err.is_retryable());
        assert!(err.is_rate_limited());
        assert_eq!(err.status(), Some(429));

        let err = Error::new(ErrorKind::GraphqlStatus {
            status: 503,
            body: String::new(),
        });
        assert!(err.is_retryable());
        assert!(!err.is_rate_limited());

        let err = Error::new(ErrorKind::GraphqlStatus {
            status: 401,
            body: "unauthorized".into(),
        });
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_rest_status_is_fatal() {
        // REST rejections never carry the GraphQL status pattern.
        for status in [404, 429, 502, 503] {
            let err = Error::new(ErrorKind::RestStatus {
                method: "GET".into(),
                url: "https://api.buildkite.com/v2/x".into(),
                status,
            });
            assert!(!err.is_retryable(), "REST {status} should be fatal");
            assert_eq!(err.status(), Some(status));
        }
    }

    #[test]
    fn test_error_kind_display_messages() {
        let cases: Vec<(ErrorKind, &str)> = vec![
            (
                ErrorKind::Serialization("key must be a string".into()),
                "failed to marshal request: key must be a string",
            ),
            (
                ErrorKind::InvalidUrl("relative URL without a base".into()),
                "failed to create request",
            ),
            (
                ErrorKind::Connection("refused".into()),
                "failed to send request: refused",
            ),
            (ErrorKind::Timeout, "timed out"),
            (
                ErrorKind::RestStatus {
                    method: "DELETE".into(),
                    url: "https://api.buildkite.com/v2/pipelines/x".into(),
                    status: 404,
                },
                "Buildkite API request failed: DELETE https://api.buildkite.com/v2/pipelines/x (status: 404)",
            ),
            (
                ErrorKind::GraphqlStatus {
                    status: 502,
                    body: "bad gateway".into(),
                },
                "returned error 502: bad gateway",
            ),
            (
                ErrorKind::Graphql {
                    messages: vec!["first".into(), "second".into()],
                },
                "GraphQL errors: first; second",
            ),
            (ErrorKind::Read("eof".into()), "failed to read response: eof"),
            (
                ErrorKind::Json("expected value".into()),
                "failed to unmarshal response: expected value",
            ),
            (
                ErrorKind::OrganizationNotFound("acme".into()),
                "organization not found: acme",
            ),
            (
                ErrorKind::Config("missing token".into()),
                "Configuration error: missing token",
            ),
            (
                ErrorKind::RetriesExhausted { attempts: 3 },
                "All 3 retry attempts exhausted",
            ),
            (ErrorKind::Other("something else".into()), "something else"),
        ];

        for (kind, expected_substring) in cases {
            let display = kind.to_string();
            assert!(
                display.contains(expected_substring),
                "Expected '{display}' to contain '{expected_substring}'"
            );
        }
    }

    #[test]
    fn test_error_with_source() {
        let source_err = std::io::Error::other("connection reset");
        let err = Error::with_source(ErrorKind::Read("body".into()), source_err);

        assert!(err.source.is_some());
        assert_eq!(err.to_string(), "failed to read response: body");
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<String>("not valid json").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err.kind, ErrorKind::Json(_)));
        assert!(err.source.is_some());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_from_url_parse_error() {
        let url_err = url::Url::parse("not a url").unwrap_err();
        let err: Error = url_err.into();
        assert!(matches!(err.kind, ErrorKind::InvalidUrl(_)));
        assert!(err.to_string().contains("failed to create request"));
    }
}
