use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use buildkite_api::client::transport::TransportFuture;
use buildkite_api::client::{
    classify, retry, ReqwestTransport, Transport, TransportConfig,
};
use buildkite_api::{BuildkiteClient, ClientConfig, ErrorClass, ErrorKind, RetryConfig};
use serde::Deserialize;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::init_tracing;

/// Decorator counting requests before delegating.
struct CountingTransport {
    next: Arc<dyn Transport>,
    count: Arc<AtomicUsize>,
}

impl Transport for CountingTransport {
    fn send(&self, request: reqwest::Request) -> TransportFuture<'_> {
        self.count.fetch_add(1, Ordering::SeqCst);
        self.next.send(request)
    }
}

#[derive(Debug, Default, Deserialize)]
struct Pipeline {
    slug: String,
}

async fn mount_organization(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(header("Authorization", "Bearer bkua_test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {"organization": {"id": "T3JnYW5pemF0aW9uLS0tMQ=="}}
        })))
        .mount(server)
        .await;
}

fn config(server: &MockServer) -> ClientConfig {
    ClientConfig::builder("acme", "bkua_test")
        .with_graphql_url(format!("{}/graphql", server.uri()))
        .with_rest_url(server.uri())
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_custom_decorator_sees_every_call() {
    init_tracing();
    let server = MockServer::start().await;
    mount_organization(&server).await;

    Mock::given(method("GET"))
        .and(path("/v2/organizations/acme/pipelines/deploy"))
        .and(header("Authorization", "Bearer bkua_test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "slug": "deploy"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let count = Arc::new(AtomicUsize::new(0));
    let counting = CountingTransport {
        next: Arc::new(ReqwestTransport::new(&TransportConfig::default()).unwrap()),
        count: count.clone(),
    };

    let client = BuildkiteClient::with_transport(
        config(&server),
        Some(Arc::new(counting) as Arc<dyn Transport>),
    )
    .await
    .unwrap();

    let mut pipeline = Pipeline::default();
    client
        .get(&client.organization_path(&["pipelines", "deploy"]), &mut pipeline)
        .await
        .unwrap();

    assert_eq!(pipeline.slug, "deploy");
    // Organization lookup plus the REST call.
    assert_eq!(count.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_construction_failure_yields_no_client() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {"organization": null}
        })))
        .mount(&server)
        .await;

    let err = BuildkiteClient::new(config(&server)).await.unwrap_err();
    assert!(matches!(err.kind, ErrorKind::OrganizationNotFound(_)));
    assert_eq!(err.classification(), ErrorClass::Fatal);
}

#[tokio::test]
async fn test_rate_limited_graphql_call_can_be_retried() {
    init_tracing();
    let server = MockServer::start().await;
    mount_organization(&server).await;
    let client = BuildkiteClient::new(config(&server)).await.unwrap();
    server.reset().await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let err = client
        .graphql()
        .query::<_, serde_json::Value>("query { viewer { id } }", serde_json::json!({}))
        .await
        .unwrap_err();
    assert!(classify::is_rate_limited(&err));

    let err = retry(
        &RetryConfig::default()
            .with_max_retries(1)
            .with_initial_delay(std::time::Duration::from_millis(5)),
        || {
            client
                .graphql()
                .query::<_, serde_json::Value>("query { viewer { id } }", serde_json::json!({}))
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::RetriesExhausted { attempts: 2 }));
}
