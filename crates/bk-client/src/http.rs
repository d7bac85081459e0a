//! HTTP client shared by GraphQL and REST calls.

use std::sync::Arc;

use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use tracing::{debug, instrument};

use crate::error::Result;
use crate::transport::Transport;

/// Cheaply cloneable handle over a transport chain.
///
/// Every request sent through it passes through the same decorators, so
/// authentication headers are applied in one place.
#[derive(Clone)]
pub struct HttpClient {
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient").finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Create a client over the given transport.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Build a request. A body is sent as `application/json`.
    pub fn request(
        &self,
        method: Method,
        url: &str,
        json_body: Option<Vec<u8>>,
    ) -> Result<reqwest::Request> {
        let url = url::Url::parse(url)?;
        let mut request = reqwest::Request::new(method, url);
        if let Some(body) = json_body {
            request
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            *request.body_mut() = Some(body.into());
        }
        Ok(request)
    }

    /// Send a request through the transport chain.
    #[instrument(skip(self, request), fields(method = %request.method(), url = %request.url()))]
    pub async fn send(&self, request: reqwest::Request) -> Result<reqwest::Response> {
        debug!("Sending request");
        let response = self.transport.send(request).await?;
        debug!(status = response.status().as_u16(), "Response received");
        Ok(response)
    }
}
