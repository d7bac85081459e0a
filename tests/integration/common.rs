use buildkite_api::client::ENV_API_TOKEN;
use tracing_subscriber::EnvFilter;

/// Install a test subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// API token for live tests.
///
/// Live tests MUST run against the real API, so a missing token is a failure,
/// not a skip.
pub fn api_token() -> String {
    match std::env::var(ENV_API_TOKEN) {
        Ok(token) if !token.is_empty() => token,
        _ => panic!(
            "{ENV_API_TOKEN} is not set. Live tests need a Buildkite API token \
             with GraphQL access: export {ENV_API_TOKEN}=bkua_..."
        ),
    }
}
