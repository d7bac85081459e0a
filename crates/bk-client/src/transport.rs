//! Request transports and header-injecting decorators.
//!
//! A [`Transport`] sends one request and yields one response. Decorators wrap
//! another transport behind an `Arc<dyn Transport>` and can be stacked:
//!
//! ```text
//! HeaderTransport ──▶ (any other decorator) ──▶ ReqwestTransport ──▶ network
//! ```

use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use tracing::trace;

use crate::config::TransportConfig;
use crate::error::{Error, ErrorKind, Result};

/// Future returned by [`Transport::send`].
pub type TransportFuture<'a> = BoxFuture<'a, Result<reqwest::Response>>;

/// The capability to send an HTTP request and receive its response.
pub trait Transport: Send + Sync {
    /// Send the request. Implementations must not retry.
    fn send(&self, request: reqwest::Request) -> TransportFuture<'_>;
}

/// Default transport backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    inner: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport from the given settings.
    pub fn new(config: &TransportConfig) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .gzip(config.accept_compressed)
            .deflate(config.accept_compressed)
            .build()
            .map_err(|e| Error::with_source(ErrorKind::Config(e.to_string()), e))?;

        Ok(Self { inner })
    }

    /// Wrap an existing reqwest client.
    pub fn from_client(inner: reqwest::Client) -> Self {
        Self { inner }
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: reqwest::Request) -> TransportFuture<'_> {
        self.inner
            .execute(request)
            .map(|result| result.map_err(Error::from))
            .boxed()
    }
}

/// Decorator that stamps a fixed header set onto every outgoing request.
///
/// Values already present on the request under the same names are replaced.
/// The header set is read-only after construction.
#[derive(Clone)]
pub struct HeaderTransport {
    next: Arc<dyn Transport>,
    headers: HeaderMap,
}

impl std::fmt::Debug for HeaderTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.headers.keys().map(|k| k.as_str()).collect();
        f.debug_struct("HeaderTransport")
            .field("headers", &names)
            .finish_non_exhaustive()
    }
}

impl HeaderTransport {
    /// Wrap `next`, or a default [`ReqwestTransport`] when `None`.
    pub fn new(next: Option<Arc<dyn Transport>>, headers: HeaderMap) -> Self {
        let next = next.unwrap_or_else(|| {
            Arc::new(ReqwestTransport::from_client(reqwest::Client::new())) as Arc<dyn Transport>
        });
        Self { next, headers }
    }

    /// The fixed header set.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn apply(&self, request: &mut reqwest::Request) {
        let target = request.headers_mut();
        for name in self.headers.keys() {
            target.remove(name);
        }
        for (name, value) in &self.headers {
            target.append(name.clone(), value.clone());
        }
    }
}

impl Transport for HeaderTransport {
    fn send(&self, mut request: reqwest::Request) -> TransportFuture<'_> {
        self.apply(&mut request);
        trace!(url = %request.url(), headers = self.headers.len(), "Injected fixed headers");
        self.next.send(request)
    }
}

/// Build the fixed authentication and identification header set.
pub fn auth_headers(api_token: &str, user_agent: &str) -> Result<HeaderMap> {
    let mut authorization = HeaderValue::from_str(&format!("Bearer {api_token}"))
        .map_err(|e| Error::with_source(ErrorKind::Config("invalid API token".to_string()), e))?;
    authorization.set_sensitive(true);

    let user_agent = HeaderValue::from_str(user_agent)
        .map_err(|e| Error::with_source(ErrorKind::Config("invalid user agent".to_string()), e))?;

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, authorization);
    headers.insert(USER_AGENT, user_agent);
    Ok(headers)
}
