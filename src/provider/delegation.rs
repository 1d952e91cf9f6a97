//! Delegation (token exchange) grant provider.

// self
#[cfg(feature = "reqwest")] use crate::http::ReqwestTokenTransport;
use crate::{
	_prelude::*,
	cache::CacheKey,
	discovery::DiscoveryFetcher,
	error::ConfigError,
	http::TokenTransport,
	obs::GrantKind,
	provider::{
		ProviderCore, ProviderFuture, TokenClientOptions, TokenProvider,
		retrieval::InboundTokenRetriever, secret_from,
	},
	token::TokenResult,
};

/// Exchanges the inbound request's bearer token for a delegated token.
///
/// The grant type defaults to `delegation` and the inbound token travels as
/// the `token` form parameter; both follow the identity provider's custom
/// grant configuration and can be overridden through the options.
pub struct DelegationTokenProvider {
	core: ProviderCore,
	inbound: Arc<dyn InboundTokenRetriever>,
}
impl DelegationTokenProvider {
	/// Creates the provider over caller-provided transport handles.
	pub fn new(
		options: TokenClientOptions,
		inbound: Arc<dyn InboundTokenRetriever>,
		transport: Arc<dyn TokenTransport>,
		fetcher: Arc<dyn DiscoveryFetcher>,
	) -> Result<Self, ConfigError> {
		Ok(Self {
			core: ProviderCore::new(GrantKind::Delegation, options, transport, fetcher)?,
			inbound,
		})
	}

	/// Creates the provider over the crate's default reqwest transport.
	#[cfg(feature = "reqwest")]
	pub fn with_reqwest(
		options: TokenClientOptions,
		inbound: Arc<dyn InboundTokenRetriever>,
	) -> Result<Self, ConfigError> {
		let transport = Arc::new(ReqwestTokenTransport::default());

		Self::new(options, inbound, transport.clone(), transport)
	}

	/// Acquires the full token result for the inbound token, `None` when the
	/// inbound request carries no bearer token.
	pub async fn token_result(&self) -> Result<Option<TokenResult>> {
		let Some(inbound_token) = self.inbound.inbound_token().await else {
			return Ok(None);
		};
		let key = CacheKey::delegation(inbound_token.expose());
		let params = vec![("token".to_owned(), inbound_token.expose().to_owned())];

		Ok(Some(self.core.acquire(key, "delegation", params).await?))
	}
}
impl TokenProvider for DelegationTokenProvider {
	fn access_token(&self) -> ProviderFuture<'_> {
		Box::pin(async move { Ok(self.token_result().await?.and_then(secret_from)) })
	}
}
impl Debug for DelegationTokenProvider {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("DelegationTokenProvider").field("core", &self.core).finish()
	}
}
