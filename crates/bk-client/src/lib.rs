//! # buildkite-client
//!
//! Core client infrastructure for the Buildkite GraphQL and REST APIs.
//!
//! This crate provides:
//! - A header-injecting transport decorator (bearer token, user agent)
//! - A GraphQL transport and a typed operation client over the same HTTP stack
//! - Organization slug resolution at construction time
//! - Generic JSON REST dispatch
//! - Retry classification of GraphQL transport errors, plus an opt-in retry helper
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     BuildkiteClient                         │
//! │  - Resolved organization id                                 │
//! │  - make_request (REST), graphql(), rpc()                    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │          GraphqlTransport / TypedGraphqlClient              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │     HttpClient ─▶ HeaderTransport ─▶ ReqwestTransport       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use buildkite_client::{BuildkiteClient, ClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), buildkite_client::Error> {
//!     let config = ClientConfig::from_env()?;
//!     let client = BuildkiteClient::new(config).await?;
//!
//!     let mut user = serde_json::Value::Null;
//!     client.get("/v2/user", &mut user).await?;
//!
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod graphql;
mod http;
mod organization;
pub mod classify;
pub mod retry;
pub mod transport;

pub use classify::ErrorClass;
pub use client::BuildkiteClient;
pub use config::{
    ClientConfig, ClientConfigBuilder, Timeouts, TransportConfig, DEFAULT_GRAPHQL_URL,
    DEFAULT_REST_URL, ENV_API_TOKEN, ENV_GRAPHQL_URL, ENV_ORGANIZATION, ENV_REST_URL,
};
pub use error::{Error, ErrorKind, Result};
pub use graphql::{
    GraphqlError, GraphqlOperation, GraphqlRequest, GraphqlResponse, GraphqlTransport,
    TypedGraphqlClient,
};
pub use http::HttpClient;
pub use organization::{
    resolve_organization_id, GetOrganization, GetOrganizationData, GetOrganizationVariables,
    OrganizationNode,
};
pub use retry::{retry, BackoffStrategy, RetryConfig, RetryPolicy};
pub use reqwest::Method;
pub use transport::{auth_headers, HeaderTransport, ReqwestTransport, Transport};

/// User-Agent string for the client
pub const USER_AGENT: &str = concat!("buildkite-api-rs/", env!("CARGO_PKG_VERSION"));
