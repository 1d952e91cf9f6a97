//! Resource Owner Password grant provider.

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
		retrieval::UserCredentialsRetriever, secret_from,
	},
	token::TokenResult,
};

/// Acquires per-user tokens with the `password` grant.
///
/// Tokens are keyed by username, so distinct users never share a token while
/// repeated calls for the same user coalesce and hit the cache.
pub struct PasswordProvider {
	core: ProviderCore,
	credentials: Arc<dyn UserCredentialsRetriever>,
}
impl PasswordProvider {
	/// Creates the provider over caller-provided transport handles.
	pub fn new(
		options: TokenClientOptions,
		credentials: Arc<dyn UserCredentialsRetriever>,
		transport: Arc<dyn TokenTransport>,
		fetcher: Arc<dyn DiscoveryFetcher>,
	) -> Result<Self, ConfigError> {
		Ok(Self {
			core: ProviderCore::new(GrantKind::Password, options, transport, fetcher)?,
			credentials,
		})
	}

	/// Creates the provider over the crate's default reqwest transport.
	#[cfg(feature = "reqwest")]
	pub fn with_reqwest(
		options: TokenClientOptions,
		credentials: Arc<dyn UserCredentialsRetriever>,
	) -> Result<Self, ConfigError> {
		let transport = Arc::new(ReqwestTokenTransport::default());

		Self::new(options, credentials, transport.clone(), transport)
	}

	/// Acquires the full token result for the ambient user, `None` when no
	/// credentials are present.
	pub async fn token_result(&self) -> Result<Option<TokenResult>> {
		let Some(credentials) = self.credentials.user_credentials().await else {
			return Ok(None);
		};
		let key = CacheKey::password(&credentials.username);
		let params = vec![
			("username".to_owned(), credentials.username),
			("password".to_owned(), credentials.password.expose().to_owned()),
		];

		Ok(Some(self.core.acquire(key, "password", params).await?))
	}
}
impl TokenProvider for PasswordProvider {
	fn access_token(&self) -> ProviderFuture<'_> {
		Box::pin(async move { Ok(self.token_result().await?.and_then(secret_from)) })
	}
}
impl Debug for PasswordProvider {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PasswordProvider").field("core", &self.core).finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		http::{TokenRequest, TransportFuture},
		provider::retrieval::{RetrievalFuture, UserCredentials},
	};

	struct NoIdentity;
	impl UserCredentialsRetriever for NoIdentity {
		fn user_credentials(&self) -> RetrievalFuture<'_, UserCredentials> {
			Box::pin(async { None })
		}
	}

	struct PanicTransport;
	impl TokenTransport for PanicTransport {
		fn request_token<'a>(&'a self, _: &'a TokenRequest) -> TransportFuture<'a> {
			panic!("An absent identity must never reach the transport.")
		}
	}
	impl crate::discovery::DiscoveryFetcher for PanicTransport {
		fn fetch_discovery<'a>(&'a self, _: &'a Url) -> crate::discovery::DiscoveryFuture<'a> {
			panic!("An absent identity must never trigger discovery.")
		}
	}

	#[tokio::test]
	async fn missing_credentials_short_circuit() {
		let options = TokenClientOptions::builder()
			.client_id("api")
			.client_secret("s3cret")
			.token_endpoint(Url::parse("https://idp.example/token").expect("Test URL should parse."))
			.build()
			.expect("Test options should build.");
		let transport = Arc::new(PanicTransport);
		let provider = PasswordProvider::new(options, Arc::new(NoIdentity), transport.clone(), transport)
			.expect("Provider construction should succeed.");

		assert!(provider.access_token().await.expect("An absent identity is not an error.").is_none());
	}
}
