//! Refresh-token grant provider.

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
		retrieval::RefreshTokenRetriever, secret_from,
	},
	token::TokenResult,
};

/// Exchanges an ambient refresh token for an access token.
///
/// Cache keys carry a SHA-512 digest of the refresh token rather than the
/// token itself, so the long-lived credential never lands in a shared cache.
pub struct RefreshTokenProvider {
	core: ProviderCore,
	refresh: Arc<dyn RefreshTokenRetriever>,
}
impl RefreshTokenProvider {
	/// Creates the provider over caller-provided transport handles.
	pub fn new(
		options: TokenClientOptions,
		refresh: Arc<dyn RefreshTokenRetriever>,
		transport: Arc<dyn TokenTransport>,
		fetcher: Arc<dyn DiscoveryFetcher>,
	) -> Result<Self, ConfigError> {
		Ok(Self {
			core: ProviderCore::new(GrantKind::RefreshToken, options, transport, fetcher)?,
			refresh,
		})
	}

	/// Creates the provider over the crate's default reqwest transport.
	#[cfg(feature = "reqwest")]
	pub fn with_reqwest(
		options: TokenClientOptions,
		refresh: Arc<dyn RefreshTokenRetriever>,
	) -> Result<Self, ConfigError> {
		let transport = Arc::new(ReqwestTokenTransport::default());

		Self::new(options, refresh, transport.clone(), transport)
	}

	/// Acquires the full token result for the ambient refresh token, `None`
	/// when no refresh token is present.
	pub async fn token_result(&self) -> Result<Option<TokenResult>> {
		let Some(refresh_token) = self.refresh.refresh_token().await else {
			return Ok(None);
		};
		let key = CacheKey::refresh_token(refresh_token.expose());
		let params = vec![("refresh_token".to_owned(), refresh_token.expose().to_owned())];

		Ok(Some(self.core.acquire(key, "refresh_token", params).await?))
	}
}
impl TokenProvider for RefreshTokenProvider {
	fn access_token(&self) -> ProviderFuture<'_> {
		Box::pin(async move { Ok(self.token_result().await?.and_then(secret_from)) })
	}
}
impl Debug for RefreshTokenProvider {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RefreshTokenProvider").field("core", &self.core).finish()
	}
}
