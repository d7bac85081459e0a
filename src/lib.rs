//! # buildkite-api
//!
//! A Buildkite API client library for Rust.
//!
//! The client authenticates every GraphQL and REST call with a bearer token,
//! resolves the organization id once at construction, and classifies GraphQL
//! transport errors so callers can decide whether to retry.
//!
//! ## Security
//!
//! - The API token is redacted in Debug output
//! - The `Authorization` header is marked sensitive
//! - Tracing spans skip request payloads and credentials
//!
//! ## Crates
//!
//! - **buildkite-client** - Transport decorators, GraphQL transport, REST dispatch, error classification
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use buildkite_api::{BuildkiteClient, ClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::builder("my-org", std::env::var("BUILDKITE_API_TOKEN")?)
//!         .build()?;
//!     let client = BuildkiteClient::new(config).await?;
//!
//!     let mut pipelines = serde_json::Value::Null;
//!     client
//!         .get(&client.organization_path(&["pipelines"]), &mut pipelines)
//!         .await?;
//!
//!     println!("{pipelines:#}");
//!     Ok(())
//! }
//! ```

// Re-export the core crate for convenient access
pub use buildkite_client as client;

// Re-export commonly used types at the top level
pub use buildkite_client::{
    BuildkiteClient, ClientConfig, Error, ErrorClass, ErrorKind, Result, RetryConfig,
};
