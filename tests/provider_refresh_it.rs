// crates.io
use httpmock::prelude::*;
// self
use oauth2_token_relay::{
	_preludet::*,
	cache::{CacheBackend, CachingPolicy, MemoryCache},
	provider::{RefreshTokenProvider, TokenProvider, retrieval::StaticRefreshToken},
	token::secret::TokenSecret,
};

fn provider(
	server: &MockServer,
	refresh_token: &str,
	backend: Arc<dyn CacheBackend>,
) -> RefreshTokenProvider {
	let transport = Arc::new(test_reqwest_transport());
	let options = test_options(&server.url("/token"))
		.caching(CachingPolicy::enabled().with_client_name("refresh-api"))
		.cache_backend(backend)
		.build()
		.expect("Test options should build.");
	let refresh = Arc::new(StaticRefreshToken(TokenSecret::new(refresh_token)));

	RefreshTokenProvider::new(options, refresh, transport.clone(), transport)
		.expect("Provider construction should succeed.")
}

#[tokio::test]
async fn refresh_exchanges_and_caches_per_source_token() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/token")
				.body_includes("grant_type=refresh_token")
				.body_includes("refresh_token=rt-source");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"access_token":"refreshed","token_type":"bearer","expires_in":900}"#);
		})
		.await;
	let provider = provider(&server, "rt-source", Arc::new(MemoryCache::new()));

	for _ in 0..2 {
		let token = provider
			.access_token()
			.await
			.expect("Acquisition should succeed.")
			.expect("A bearer token should be present.");

		assert_eq!(token.expose(), "refreshed");
	}

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn distinct_refresh_tokens_fetch_independently() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"access_token":"refreshed","token_type":"bearer","expires_in":900}"#);
		})
		.await;
	let backend: Arc<dyn CacheBackend> = Arc::new(MemoryCache::new());
	let first = provider(&server, "rt-a", backend.clone());
	let second = provider(&server, "rt-b", backend);

	first.access_token().await.expect("First acquisition should succeed.");
	second.access_token().await.expect("Second acquisition should succeed.");

	mock.assert_calls_async(2).await;
}
