//! Client Credentials grant provider.

// self
#[cfg(feature = "reqwest")] use crate::http::ReqwestTokenTransport;
use crate::{
	_prelude::*,
	cache::CacheKey,
	discovery::DiscoveryFetcher,
	error::ConfigError,
	http::TokenTransport,
	obs::GrantKind,
	provider::{ProviderCore, ProviderFuture, TokenClientOptions, TokenProvider, secret_from},
	token::TokenResult,
};

/// Acquires machine-to-machine tokens with the `client_credentials` grant.
///
/// All callers of one provider instance share a single logical token; the
/// cache key never varies.
#[derive(Debug)]
pub struct ClientCredentialsProvider {
	core: ProviderCore,
}
impl ClientCredentialsProvider {
	/// Creates the provider over caller-provided transport handles.
	pub fn new(
		options: TokenClientOptions,
		transport: Arc<dyn TokenTransport>,
		fetcher: Arc<dyn DiscoveryFetcher>,
	) -> Result<Self, ConfigError> {
		Ok(Self {
			core: ProviderCore::new(GrantKind::ClientCredentials, options, transport, fetcher)?,
		})
	}

	/// Creates the provider over the crate's default reqwest transport.
	#[cfg(feature = "reqwest")]
	pub fn with_reqwest(options: TokenClientOptions) -> Result<Self, ConfigError> {
		let transport = Arc::new(ReqwestTokenTransport::default());

		Self::new(options, transport.clone(), transport)
	}

	/// Acquires the full token result, including error responses under
	/// [`FailurePolicy::Degrade`](crate::engine::FailurePolicy).
	pub async fn token_result(&self) -> Result<TokenResult> {
		self.core.acquire(CacheKey::client_credentials(), "client_credentials", Vec::new()).await
	}
}
impl TokenProvider for ClientCredentialsProvider {
	fn access_token(&self) -> ProviderFuture<'_> {
		Box::pin(async move { Ok(secret_from(self.token_result().await?)) })
	}
}
