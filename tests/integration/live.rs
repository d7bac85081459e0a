use buildkite_api::client::{ENV_ORGANIZATION, DEFAULT_GRAPHQL_URL, DEFAULT_REST_URL};
use buildkite_api::{BuildkiteClient, ClientConfig};

use crate::common::{api_token, init_tracing};

#[tokio::test]
#[ignore]
async fn test_unknown_organization_fails_construction() {
    init_tracing();

    let config = ClientConfig::builder("doesnt match API key", api_token())
        .with_graphql_url(DEFAULT_GRAPHQL_URL)
        .with_rest_url(DEFAULT_REST_URL)
        .with_user_agent("test-user-agent")
        .build()
        .unwrap();

    let result = BuildkiteClient::new(config).await;
    assert!(result.is_err(), "Nonexistent organization found");
}

#[tokio::test]
#[ignore]
async fn test_resolves_configured_organization() {
    init_tracing();

    let slug = std::env::var(ENV_ORGANIZATION)
        .unwrap_or_else(|_| panic!("{ENV_ORGANIZATION} must be set for this test"));
    let config = ClientConfig::builder(slug.clone(), api_token())
        .build()
        .unwrap();

    let client = BuildkiteClient::new(config).await.unwrap();
    assert_eq!(client.organization(), slug);
    assert!(!client.organization_id().is_empty());

    let mut organization = serde_json::Value::Null;
    client
        .get(&client.organization_path(&[]), &mut organization)
        .await
        .unwrap();
    assert_eq!(organization["slug"], slug.as_str());
}
