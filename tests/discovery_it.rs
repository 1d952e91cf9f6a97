// crates.io
use httpmock::prelude::*;
// self
use oauth2_token_relay::{
	_preludet::*,
	discovery::{DiscoveryError, DiscoveryPolicy, TokenEndpointResolver},
	provider::{ClientCredentialsProvider, TokenProvider},
};

fn authority(server: &MockServer) -> Url {
	Url::parse(&server.url("")).expect("Mock authority should parse successfully.")
}

fn discovery_body(server: &MockServer) -> String {
	format!(
		r#"{{"issuer":"{issuer}","token_endpoint":"{endpoint}"}}"#,
		issuer = server.url(""),
		endpoint = server.url("/connect/token"),
	)
}

#[tokio::test]
async fn discovery_resolves_once_across_concurrent_acquisitions() {
	let server = MockServer::start_async().await;
	let discovery_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/.well-known/openid-configuration");
			then.status(200)
				.header("content-type", "application/json")
				.body(discovery_body(&server));
		})
		.await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/connect/token");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"access_token":"discovered","token_type":"bearer","expires_in":120}"#);
		})
		.await;
	let transport = Arc::new(test_reqwest_transport());
	let options = provider_options(&server);
	let provider = ClientCredentialsProvider::new(options, transport.clone(), transport)
		.expect("Provider construction should succeed.");
	let (first, second, third) =
		tokio::join!(provider.access_token(), provider.access_token(), provider.access_token());

	for token in [first, second, third] {
		assert_eq!(
			token
				.expect("Acquisition should succeed.")
				.expect("A bearer token should be present.")
				.expose(),
			"discovered"
		);
	}

	discovery_mock.assert_calls_async(1).await;
	token_mock.assert_calls_async(1).await;

	// A later wave reuses the resolved endpoint without a second fetch.
	provider.access_token().await.expect("Acquisition should succeed.");

	discovery_mock.assert_calls_async(1).await;
	token_mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn unreachable_discovery_is_classified_unavailable() {
	let server = MockServer::start_async().await;
	let resolver =
		TokenEndpointResolver::from_authority(authority(&server), DiscoveryPolicy::default());
	let error = resolver
		.resolve(&test_reqwest_transport())
		.await
		.expect_err("A 404 discovery endpoint cannot resolve.");

	assert!(matches!(error, DiscoveryError::Unavailable { .. }));
	assert!(error.to_string().starts_with("Discovery endpoint"));
}

#[tokio::test]
async fn foreign_issuer_is_classified_as_policy_error() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/.well-known/openid-configuration");
			then.status(200).header("content-type", "application/json").body(format!(
				r#"{{"issuer":"https://evil.example","token_endpoint":"{}"}}"#,
				server.url("/connect/token"),
			));
		})
		.await;
	let resolver =
		TokenEndpointResolver::from_authority(authority(&server), DiscoveryPolicy::default());
	let error = resolver
		.resolve(&test_reqwest_transport())
		.await
		.expect_err("A foreign issuer must violate the default policy.");

	assert!(matches!(error, DiscoveryError::PolicyViolation { .. }));
	assert!(error.to_string().starts_with("Policy error while contacting the discovery endpoint"));
}

#[tokio::test]
async fn malformed_document_is_classified_as_parse_error() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/.well-known/openid-configuration");
			then.status(200).header("content-type", "application/json").body("not a document");
		})
		.await;
	let resolver =
		TokenEndpointResolver::from_authority(authority(&server), DiscoveryPolicy::default());
	let error = resolver
		.resolve(&test_reqwest_transport())
		.await
		.expect_err("A malformed document cannot resolve.");

	assert!(matches!(error, DiscoveryError::Parse { .. }));
	assert!(error.to_string().starts_with("Error parsing discovery document from"));
}

fn provider_options(server: &MockServer) -> oauth2_token_relay::provider::TokenClientOptions {
	oauth2_token_relay::provider::TokenClientOptions::builder()
		.client_id("test-client")
		.client_secret("test-secret")
		.authority(authority(server))
		.build()
		.expect("Test options should build.")
}
