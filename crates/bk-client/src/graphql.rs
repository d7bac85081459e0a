//! GraphQL-over-HTTP transport and typed operation client.

use std::sync::Arc;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{Error, ErrorKind, Result};
use crate::http::HttpClient;

const MAX_ERROR_BODY: usize = 4096;

/// GraphQL request payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlRequest<'a, V> {
    pub query: &'a str,
    pub variables: V,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<&'a str>,
}

/// A single entry of a GraphQL `errors` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphqlError {
    /// Human-readable error message.
    pub message: String,
    /// Path within the response where the error occurred.
    #[serde(default)]
    pub path: Vec<serde_json::Value>,
    /// Extensions metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<serde_json::Value>,
}

/// GraphQL response container.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct GraphqlResponse<T> {
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphqlError>,
    #[serde(default)]
    pub extensions: Option<serde_json::Value>,
}

impl<T> GraphqlResponse<T> {
    /// Returns the data, or an error if the server reported any.
    pub fn into_data(self) -> Result<T> {
        if !self.errors.is_empty() {
            return Err(Error::new(ErrorKind::Graphql {
                messages: self.errors.into_iter().map(|e| e.message).collect(),
            }));
        }
        self.data
            .ok_or_else(|| Error::new(ErrorKind::Protocol("missing GraphQL data".to_string())))
    }
}

/// Untyped GraphQL transport bound to one endpoint.
///
/// Non-2xx responses become [`ErrorKind::GraphqlStatus`], whose text is
/// `returned error NNN: <body>`; see [`crate::classify`].
#[derive(Debug, Clone)]
pub struct GraphqlTransport {
    endpoint: String,
    http: HttpClient,
}

impl GraphqlTransport {
    /// Create a transport posting to `endpoint` through `http`.
    pub fn new(endpoint: impl Into<String>, http: HttpClient) -> Self {
        Self {
            endpoint: endpoint.into(),
            http,
        }
    }

    /// The GraphQL endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Execute a query and return the raw response envelope.
    #[instrument(skip(self, query, variables), fields(endpoint = %self.endpoint))]
    pub async fn execute<V, R>(
        &self,
        query: &str,
        variables: V,
        operation_name: Option<&str>,
    ) -> Result<GraphqlResponse<R>>
    where
        V: Serialize,
        R: DeserializeOwned,
    {
        let body = serde_json::to_vec(&GraphqlRequest {
            query,
            variables,
            operation_name,
        })
        .map_err(|e| Error::with_source(ErrorKind::Serialization(e.to_string()), e))?;

        let request = self.http.request(Method::POST, &self.endpoint, Some(body))?;
        let response = self.http.send(request).await?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::with_source(ErrorKind::Read(e.to_string()), e))?;

        if !status.is_success() {
            debug!(status = status.as_u16(), "GraphQL request rejected");
            return Err(Error::new(ErrorKind::GraphqlStatus {
                status: status.as_u16(),
                body: truncate_body(&bytes),
            }));
        }

        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Execute a query and return its data, failing on GraphQL errors.
    pub async fn query<V, R>(&self, query: &str, variables: V) -> Result<R>
    where
        V: Serialize,
        R: DeserializeOwned,
    {
        self.execute(query, variables, None).await?.into_data()
    }
}

fn truncate_body(bytes: &[u8]) -> String {
    let mut body = String::from_utf8_lossy(bytes).trim().to_string();
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
        body.push_str("...[truncated]");
    }
    body
}

/// Typed GraphQL operation definition.
///
/// Implement this for each query or mutation.
pub trait GraphqlOperation {
    /// Variables type.
    type Variables: Serialize + Send + Sync;
    /// Response data type.
    type ResponseData: DeserializeOwned + Send;

    /// GraphQL document text.
    const QUERY: &'static str;
    /// Operation name.
    const OPERATION_NAME: &'static str;
}

/// Typed RPC client issuing [`GraphqlOperation`]s over a shared transport.
#[derive(Debug, Clone)]
pub struct TypedGraphqlClient {
    transport: Arc<GraphqlTransport>,
}

impl TypedGraphqlClient {
    /// Create a typed client over `transport`.
    pub fn new(transport: Arc<GraphqlTransport>) -> Self {
        Self { transport }
    }

    /// The underlying transport.
    pub fn transport(&self) -> &GraphqlTransport {
        &self.transport
    }

    /// Execute an operation and return the full response envelope.
    pub async fn execute<O: GraphqlOperation>(
        &self,
        variables: O::Variables,
    ) -> Result<GraphqlResponse<O::ResponseData>> {
        debug!(operation = O::OPERATION_NAME, "Executing GraphQL operation");
        self.transport
            .execute(O::QUERY, variables, Some(O::OPERATION_NAME))
            .await
    }

    /// Execute an operation and return data only (error on GraphQL errors).
    pub async fn execute_strict<O: GraphqlOperation>(
        &self,
        variables: O::Variables,
    ) -> Result<O::ResponseData> {
        self.execute::<O>(variables).await?.into_data()
    }
}
