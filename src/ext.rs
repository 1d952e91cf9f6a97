//! Outbound request helpers.

// self
use crate::{_prelude::*, provider::TokenProvider};

/// Applies a provider's bearer token to an outbound request.
///
/// `None` tokens leave the request untouched so it proceeds unauthenticated,
/// matching the degrade posture of the handler-style providers. Configuration,
/// discovery, and propagated grant failures still fail the request.
pub async fn authorize_request(
	provider: &dyn TokenProvider,
	request: reqwest::RequestBuilder,
) -> Result<reqwest::RequestBuilder> {
	Ok(match provider.access_token().await? {
		Some(token) => request.bearer_auth(token.expose()),
		None => request,
	})
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		provider::{PassThroughProvider, retrieval::{InboundTokenRetriever, RetrievalFuture, StaticInboundToken}},
		token::secret::TokenSecret,
	};

	struct NoInbound;
	impl InboundTokenRetriever for NoInbound {
		fn inbound_token(&self) -> RetrievalFuture<'_, TokenSecret> {
			Box::pin(async { None })
		}
	}

	#[tokio::test]
	async fn authorize_request_sets_the_bearer_header() {
		let provider =
			PassThroughProvider::new(Arc::new(StaticInboundToken(TokenSecret::new("tok"))));
		let request = authorize_request(&provider, ReqwestClient::new().get("https://api.example/"))
			.await
			.expect("Authorization should succeed.")
			.build()
			.expect("Request should build.");

		assert_eq!(
			request
				.headers()
				.get(reqwest::header::AUTHORIZATION)
				.and_then(|value| value.to_str().ok()),
			Some("Bearer tok")
		);
	}

	#[tokio::test]
	async fn missing_token_leaves_the_request_unauthenticated() {
		let provider = PassThroughProvider::new(Arc::new(NoInbound));
		let request = authorize_request(&provider, ReqwestClient::new().get("https://api.example/"))
			.await
			.expect("Degraded authorization should succeed.")
			.build()
			.expect("Request should build.");

		assert!(request.headers().get(reqwest::header::AUTHORIZATION).is_none());
	}
}
