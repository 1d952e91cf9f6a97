//! Transport primitives for token endpoint exchanges.
//!
//! [`TokenTransport`] is the relay's only dependency on an HTTP stack. Grant
//! strategies assemble a [`TokenRequest`] and the transport answers with a
//! [`TokenResult`], never an error: transport faults and unparseable bodies
//! are folded into failure tokens so the acquisition pipeline handles every
//! outcome uniformly.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// self
use crate::{_prelude::*, token::TokenResult};
#[cfg(feature = "reqwest")]
use crate::discovery::{DiscoveryDocument, DiscoveryError, DiscoveryFetcher, DiscoveryFuture};

/// Boxed future returned by [`TokenTransport`].
pub type TransportFuture<'a> = Pin<Box<dyn Future<Output = TokenResult> + 'a + Send>>;

/// A form-encoded POST against a token endpoint.
///
/// Parameters carry the grant type, client credentials, and any grant-specific
/// material; secrets travel in the body rather than an Authorization header.
#[derive(Clone)]
pub struct TokenRequest {
	/// Resolved token endpoint to POST against.
	pub endpoint: Url,
	/// Form parameters, in insertion order.
	pub params: Vec<(String, String)>,
}
impl TokenRequest {
	/// Creates a request with no parameters.
	pub fn new(endpoint: Url) -> Self {
		Self { endpoint, params: Vec::new() }
	}

	/// Appends one form parameter.
	pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.params.push((name.into(), value.into()));

		self
	}
}
impl Debug for TokenRequest {
	// Parameter values carry client secrets and resource owner passwords.
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let names = self.params.iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>();

		f.debug_struct("TokenRequest")
			.field("endpoint", &self.endpoint)
			.field("params", &names)
			.finish()
	}
}

/// Abstraction over HTTP transports capable of executing a token exchange.
///
/// Implementations must be `Send + Sync + 'static` so they can be shared
/// across relay instances behind an `Arc` without additional wrappers.
pub trait TokenTransport
where
	Self: 'static + Send + Sync,
{
	/// Executes the exchange and folds every failure into a [`TokenResult`].
	fn request_token<'a>(&'a self, request: &'a TokenRequest) -> TransportFuture<'a>;
}

/// Maps an HTTP status + body pair onto a token outcome.
///
/// Error bodies that carry an OAuth `error` field become error tokens with
/// the endpoint's own classification; anything else collapses into a failure
/// token naming the status or the parse problem.
pub(crate) fn classify_response(status: u16, body: &[u8]) -> TokenResult {
	let success = (200..300).contains(&status);

	match TokenResult::from_payload(body) {
		Ok(token) if success || token.is_error() => token,
		Ok(_) => TokenResult::failure(format!("HTTP {status}")),
		Err(error) if success => TokenResult::failure(format!("response parse error: {error}")),
		Err(_) => TokenResult::failure(format!("HTTP {status}")),
	}
}

/// Joins an authority onto its OIDC discovery document URL.
#[cfg(feature = "reqwest")]
pub(crate) fn discovery_url(authority: &Url) -> Result<Url, DiscoveryError> {
	let mut base = authority.clone();

	if !base.path().ends_with('/') {
		base.set_path(&format!("{}/", base.path()));
	}

	base.join(".well-known/openid-configuration").map_err(|e| DiscoveryError::Unavailable {
		authority: authority.to_string(),
		reason: e.to_string(),
	})
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
/// Token requests should not follow redirects, matching OAuth 2.0 guidance that token
/// endpoints return results directly instead of delegating to another URI; configure
/// any custom [`ReqwestClient`] accordingly.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTokenTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTokenTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTokenTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTokenTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl TokenTransport for ReqwestTokenTransport {
	fn request_token<'a>(&'a self, request: &'a TokenRequest) -> TransportFuture<'a> {
		Box::pin(async move {
			let response = match self
				.0
				.post(request.endpoint.clone())
				.form(&request.params)
				.send()
				.await
			{
				Ok(response) => response,
				Err(error) => return TokenResult::failure(error.without_url().to_string()),
			};
			let status = response.status().as_u16();
			let body = match response.bytes().await {
				Ok(body) => body,
				Err(error) => return TokenResult::failure(error.without_url().to_string()),
			};

			classify_response(status, &body)
		})
	}
}
#[cfg(feature = "reqwest")]
impl DiscoveryFetcher for ReqwestTokenTransport {
	fn fetch_discovery<'a>(&'a self, authority: &'a Url) -> DiscoveryFuture<'a> {
		Box::pin(async move {
			let unavailable = |reason: String| DiscoveryError::Unavailable {
				authority: authority.to_string(),
				reason,
			};
			let url = discovery_url(authority)?;
			let response = self
				.0
				.get(url)
				.send()
				.await
				.map_err(|e| unavailable(e.without_url().to_string()))?;
			let status = response.status();

			if !status.is_success() {
				return Err(unavailable(format!("HTTP {}", status.as_u16())));
			}

			let body = response.bytes().await.map_err(|e| unavailable(e.without_url().to_string()))?;
			let mut deserializer = serde_json::Deserializer::from_slice(&body);

			serde_path_to_error::deserialize::<_, DiscoveryDocument>(&mut deserializer).map_err(
				|e| DiscoveryError::Parse { authority: authority.to_string(), reason: e.to_string() },
			)
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn classify_response_maps_every_shape() {
		let ok = classify_response(200, br#"{"access_token":"at","expires_in":60}"#);

		assert!(!ok.is_error());
		assert_eq!(ok.expires_in, Some(60));

		let oauth = classify_response(400, br#"{"error":"invalid_grant"}"#);

		assert_eq!(oauth.error.as_deref(), Some("invalid_grant"));

		let opaque = classify_response(503, b"<html>gateway timeout</html>");

		assert_eq!(opaque.error.as_deref(), Some("HTTP 503"));

		let garbled = classify_response(200, b"not json");

		assert!(
			garbled.error.as_deref().is_some_and(|e| e.starts_with("response parse error")),
			"A 2xx body that fails to parse must surface the parse problem."
		);
	}

	#[cfg(feature = "reqwest")]
	#[test]
	fn discovery_url_joins_well_known_suffix() {
		for authority in ["https://idp.example", "https://idp.example/", "https://idp.example/tenant"]
		{
			let url = discovery_url(&Url::parse(authority).expect("Test URL should parse."))
				.expect("Discovery URL should join.");

			assert!(
				url.path().ends_with("/.well-known/openid-configuration"),
				"{url} must end with the discovery suffix."
			);
			assert!(url.path().starts_with(Url::parse(authority).expect("Test URL should parse.").path().trim_end_matches('/')));
		}
	}

	#[test]
	fn token_request_debug_redacts_values() {
		let request = TokenRequest::new(Url::parse("https://idp.example/token").expect("Test URL should parse."))
			.with_param("grant_type", "password")
			.with_param("password", "hunter2");
		let rendered = format!("{request:?}");

		assert!(rendered.contains("grant_type"));
		assert!(!rendered.contains("hunter2"));
	}
}
