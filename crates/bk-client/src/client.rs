//! Buildkite API client: construction and generic REST dispatch.

use std::sync::Arc;

use reqwest::Method;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::config::{ClientConfig, Timeouts};
use crate::error::{Error, ErrorKind, Result};
use crate::graphql::{GraphqlTransport, TypedGraphqlClient};
use crate::http::HttpClient;
use crate::organization::resolve_organization_id;
use crate::transport::{auth_headers, HeaderTransport, ReqwestTransport, Transport};

/// Long-lived handle to the Buildkite GraphQL and REST APIs.
///
/// A client only exists once its organization has been resolved. All state is
/// fixed at construction, so a client can be cloned and shared across tasks.
///
/// # Example
///
/// ```rust,ignore
/// use buildkite_client::{BuildkiteClient, ClientConfig};
///
/// let config = ClientConfig::builder("acme", token).build()?;
/// let client = BuildkiteClient::new(config).await?;
///
/// let mut pipeline = Pipeline::default();
/// client
///     .get(&client.organization_path(&["pipelines", "deploy"]), &mut pipeline)
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct BuildkiteClient {
    graphql: Arc<GraphqlTransport>,
    rpc: TypedGraphqlClient,
    http: HttpClient,
    organization: String,
    organization_id: String,
    rest_url: String,
    timeouts: Timeouts,
}

impl BuildkiteClient {
    /// Build a client over the default transport and resolve the organization.
    pub async fn new(config: ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(&config.transport)?;
        Self::with_transport(config, Some(Arc::new(transport) as Arc<dyn Transport>)).await
    }

    /// Build a client whose header decorator wraps `next`.
    ///
    /// `None` uses a default [`ReqwestTransport`]. Fails without producing a
    /// client if the organization cannot be resolved.
    #[instrument(skip_all, fields(organization = %config.organization))]
    pub async fn with_transport(
        config: ClientConfig,
        next: Option<Arc<dyn Transport>>,
    ) -> Result<Self> {
        let headers = auth_headers(&config.api_token, &config.user_agent)?;
        let http = HttpClient::new(Arc::new(HeaderTransport::new(next, headers)));

        let graphql = Arc::new(GraphqlTransport::new(config.graphql_url, http.clone()));
        let rpc = TypedGraphqlClient::new(graphql.clone());

        let organization_id = resolve_organization_id(&config.organization, &rpc).await?;
        info!(%organization_id, "Buildkite client ready");

        Ok(Self {
            graphql,
            rpc,
            http,
            organization: config.organization,
            organization_id,
            rest_url: config.rest_url,
            timeouts: config.timeouts,
        })
    }

    /// Untyped GraphQL transport.
    pub fn graphql(&self) -> &GraphqlTransport {
        &self.graphql
    }

    /// Typed GraphQL client sharing the same transport.
    pub fn rpc(&self) -> &TypedGraphqlClient {
        &self.rpc
    }

    /// Header-decorated HTTP client.
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Organization slug.
    pub fn organization(&self) -> &str {
        &self.organization
    }

    /// Resolved organization id.
    pub fn organization_id(&self) -> &str {
        &self.organization_id
    }

    /// REST base URL.
    pub fn rest_url(&self) -> &str {
        &self.rest_url
    }

    /// Operation timeouts from the configuration.
    pub fn timeouts(&self) -> &Timeouts {
        &self.timeouts
    }

    /// Path of an organization-scoped REST resource.
    ///
    /// Each segment is percent-encoded:
    /// `["pipelines", "my pipe"]` -> `/v2/organizations/<org>/pipelines/my%20pipe`.
    pub fn organization_path(&self, segments: &[&str]) -> String {
        let mut path = format!(
            "/v2/organizations/{}",
            urlencoding::encode(&self.organization)
        );
        for segment in segments {
            path.push('/');
            path.push_str(&urlencoding::encode(segment));
        }
        path
    }

    /// Issue a REST request and decode the JSON response into `destination`.
    ///
    /// The URL is `rest_url` followed by `path`, with no slash normalization.
    /// Status >= 400 is an error carrying method, URL and status. A 204 leaves
    /// `destination` untouched. Dropping the future cancels the request.
    #[instrument(skip(self, method, payload, destination), fields(method = %method))]
    pub async fn make_request<B, T>(
        &self,
        method: Method,
        path: &str,
        payload: Option<&B>,
        destination: &mut T,
    ) -> Result<()>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = payload
            .map(|p| {
                serde_json::to_vec(p)
                    .map_err(|e| Error::with_source(ErrorKind::Serialization(e.to_string()), e))
            })
            .transpose()?;

        let url = format!("{}{}", self.rest_url, path);
        let request = self.http.request(method.clone(), &url, body)?;
        let response = self.http.send(request).await?;

        let status = response.status().as_u16();
        if status >= 400 {
            return Err(Error::new(ErrorKind::RestStatus {
                method: method.to_string(),
                url,
                status,
            }));
        }
        if status == 204 {
            debug!("No content");
            return Ok(());
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::with_source(ErrorKind::Read(e.to_string()), e))?;
        *destination = serde_json::from_slice(&bytes)?;
        Ok(())
    }

    /// GET `path` into `destination`.
    pub async fn get<T: DeserializeOwned>(&self, path: &str, destination: &mut T) -> Result<()> {
        self.make_request(Method::GET, path, None::<&()>, destination)
            .await
    }

    /// POST `payload` to `path`, decoding the response into `destination`.
    pub async fn post<B, T>(&self, path: &str, payload: &B, destination: &mut T) -> Result<()>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.make_request(Method::POST, path, Some(payload), destination)
            .await
    }

    /// PUT `payload` to `path`, decoding the response into `destination`.
    pub async fn put<B, T>(&self, path: &str, payload: &B, destination: &mut T) -> Result<()>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.make_request(Method::PUT, path, Some(payload), destination)
            .await
    }

    /// PATCH `path` with `payload`, decoding the response into `destination`.
    pub async fn patch<B, T>(&self, path: &str, payload: &B, destination: &mut T) -> Result<()>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.make_request(Method::PATCH, path, Some(payload), destination)
            .await
    }

    /// DELETE `path`, discarding any response body.
    pub async fn delete(&self, path: &str) -> Result<()> {
        let mut ignored = IgnoredAny;
        self.make_request(Method::DELETE, path, None::<&()>, &mut ignored)
            .await
    }
}
