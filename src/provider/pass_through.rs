//! Pass-through provider: forwards the inbound bearer token unchanged.

// self
use crate::{
	_prelude::*,
	provider::{ProviderFuture, TokenProvider, retrieval::InboundTokenRetriever},
};

/// Forwards the inbound request's bearer token to the outbound request.
///
/// No upstream exchange and no caching: the token is used as-is, so the
/// downstream API must accept the same audience as the inbound one.
pub struct PassThroughProvider {
	inbound: Arc<dyn InboundTokenRetriever>,
}
impl PassThroughProvider {
	/// Creates the provider over an inbound token retriever.
	pub fn new(inbound: Arc<dyn InboundTokenRetriever>) -> Self {
		Self { inbound }
	}
}
impl TokenProvider for PassThroughProvider {
	fn access_token(&self) -> ProviderFuture<'_> {
		Box::pin(async move { Ok(self.inbound.inbound_token().await) })
	}
}
impl Debug for PassThroughProvider {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("PassThroughProvider(..)")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		provider::retrieval::{RetrievalFuture, StaticInboundToken},
		token::secret::TokenSecret,
	};

	struct NoInbound;
	impl InboundTokenRetriever for NoInbound {
		fn inbound_token(&self) -> RetrievalFuture<'_, TokenSecret> {
			Box::pin(async { None })
		}
	}

	#[tokio::test]
	async fn forwards_the_inbound_token_verbatim() {
		let provider = PassThroughProvider::new(Arc::new(StaticInboundToken(TokenSecret::new("inbound"))));
		let token = provider
			.access_token()
			.await
			.expect("Pass-through never fails.")
			.expect("A present inbound token must be forwarded.");

		assert_eq!(token.expose(), "inbound");
	}

	#[tokio::test]
	async fn missing_inbound_token_degrades() {
		let provider = PassThroughProvider::new(Arc::new(NoInbound));

		assert!(provider.access_token().await.expect("Pass-through never fails.").is_none());
	}
}
