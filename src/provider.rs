//! Grant-specific token providers built over the shared acquisition engine.
//!
//! Each provider pairs a cache-key builder with a fetch function and hands
//! both to [`AcquisitionEngine`]; everything else — caching, coalescing,
//! events, failure policy — is shared. Identity-absent cases short-circuit
//! here: a provider answers `Ok(None)` without touching the cache or the
//! registry when its retriever has nothing to offer.

pub mod retrieval;

pub mod client_credentials;
pub mod delegation;
pub mod pass_through;
pub mod password;
pub mod refresh;

pub use client_credentials::*;
pub use delegation::*;
pub use pass_through::*;
pub use password::*;
pub use refresh::*;

// self
use crate::{
	_prelude::*,
	cache::{CacheBackend, CacheKey, CachingPolicy, TokenCacheStore},
	discovery::{DiscoveryFetcher, DiscoveryPolicy, TokenEndpointResolver},
	engine::{AcquisitionEngine, FailurePolicy, FetchOutcome},
	error::ConfigError,
	events::TokenEvents,
	http::{TokenRequest, TokenTransport},
	obs::GrantKind,
	token::{TokenResult, secret::TokenSecret},
};

/// Boxed future returned by [`TokenProvider::access_token`].
pub type ProviderFuture<'a> = Pin<Box<dyn Future<Output = Result<Option<TokenSecret>>> + 'a + Send>>;

/// A source of bearer tokens for outbound requests.
///
/// `Ok(None)` means "proceed unauthenticated": the ambient identity is absent
/// or the acquisition degraded under [`FailurePolicy::Degrade`]. Errors only
/// surface for configuration problems, discovery failures, and rejected
/// grants under [`FailurePolicy::Propagate`].
pub trait TokenProvider
where
	Self: Send + Sync,
{
	/// Returns the bearer token to attach, if any.
	fn access_token(&self) -> ProviderFuture<'_>;
}

/// Configuration shared by every grant provider.
///
/// Build through [`TokenClientOptions::builder`]; the builder validates the
/// combination before any provider sees it.
#[derive(Clone)]
pub struct TokenClientOptions {
	/// OAuth 2.0 client identifier sent with every grant.
	pub client_id: String,
	/// Client secret sent in the request body.
	pub client_secret: TokenSecret,
	/// Authority whose discovery document names the token endpoint.
	pub authority: Option<Url>,
	/// Static token endpoint; wins over the authority when both are set.
	pub token_endpoint: Option<Url>,
	/// Validation applied to fetched discovery documents.
	pub discovery_policy: DiscoveryPolicy,
	/// Overrides the provider's default `grant_type` value.
	pub grant_type: Option<String>,
	/// Scope requested with every grant.
	pub scope: Option<String>,
	/// Extra form parameters appended to every token request.
	pub extra_params: Vec<(String, String)>,
	/// Caching behavior; disabled by default.
	pub caching: CachingPolicy,
	/// Byte cache the tokens are persisted in; required when caching is on.
	pub cache_backend: Option<Arc<dyn CacheBackend>>,
	/// How rejected grants surface to callers.
	pub failure_policy: FailurePolicy,
	/// Hooks fired once per settled fetch wave.
	pub events: TokenEvents,
}
impl TokenClientOptions {
	/// Starts building a validated options value.
	pub fn builder() -> TokenClientOptionsBuilder {
		TokenClientOptionsBuilder::default()
	}
}
impl Debug for TokenClientOptions {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenClientOptions")
			.field("client_id", &self.client_id)
			.field("client_secret", &self.client_secret)
			.field("authority", &self.authority)
			.field("token_endpoint", &self.token_endpoint)
			.field("grant_type", &self.grant_type)
			.field("scope", &self.scope)
			.field("caching", &self.caching)
			.field("failure_policy", &self.failure_policy)
			.finish()
	}
}

/// Builder for [`TokenClientOptions`]; [`build`](Self::build) validates.
#[derive(Clone, Default)]
pub struct TokenClientOptionsBuilder {
	client_id: String,
	client_secret: String,
	authority: Option<Url>,
	token_endpoint: Option<Url>,
	discovery_policy: Option<DiscoveryPolicy>,
	grant_type: Option<String>,
	scope: Option<String>,
	extra_params: Vec<(String, String)>,
	caching: Option<CachingPolicy>,
	cache_backend: Option<Arc<dyn CacheBackend>>,
	failure_policy: FailurePolicy,
	events: TokenEvents,
}
impl TokenClientOptionsBuilder {
	/// Sets the OAuth 2.0 client identifier. Required.
	pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
		self.client_id = client_id.into();

		self
	}

	/// Sets the client secret. Required.
	pub fn client_secret(mut self, client_secret: impl Into<String>) -> Self {
		self.client_secret = client_secret.into();

		self
	}

	/// Sets the authority to resolve the token endpoint from.
	pub fn authority(mut self, authority: Url) -> Self {
		self.authority = Some(authority);

		self
	}

	/// Sets a static token endpoint, bypassing discovery.
	pub fn token_endpoint(mut self, endpoint: Url) -> Self {
		self.token_endpoint = Some(endpoint);

		self
	}

	/// Overrides the default discovery document validation rules.
	pub fn discovery_policy(mut self, policy: DiscoveryPolicy) -> Self {
		self.discovery_policy = Some(policy);

		self
	}

	/// Overrides the provider's default `grant_type` value.
	pub fn grant_type(mut self, grant_type: impl Into<String>) -> Self {
		self.grant_type = Some(grant_type.into());

		self
	}

	/// Sets the scope requested with every grant.
	pub fn scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = Some(scope.into());

		self
	}

	/// Appends one extra form parameter sent with every token request.
	pub fn extra_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.extra_params.push((name.into(), value.into()));

		self
	}

	/// Enables caching under the provided policy.
	pub fn caching(mut self, policy: CachingPolicy) -> Self {
		self.caching = Some(policy);

		self
	}

	/// Sets the byte cache backing the token store.
	pub fn cache_backend(mut self, backend: Arc<dyn CacheBackend>) -> Self {
		self.cache_backend = Some(backend);

		self
	}

	/// Sets how rejected grants surface to callers.
	pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
		self.failure_policy = policy;

		self
	}

	/// Sets the acquisition event hooks.
	pub fn events(mut self, events: TokenEvents) -> Self {
		self.events = events;

		self
	}

	/// Validates and produces the options.
	pub fn build(self) -> Result<TokenClientOptions, ConfigError> {
		if self.client_id.is_empty() {
			return Err(ConfigError::MissingClientId);
		}
		if self.client_secret.is_empty() {
			return Err(ConfigError::MissingClientSecret);
		}
		if self.authority.is_none() && self.token_endpoint.is_none() {
			return Err(ConfigError::MissingEndpoint);
		}

		let caching = self.caching.unwrap_or_default();

		if caching.enabled && self.cache_backend.is_none() {
			return Err(ConfigError::MissingCacheBackend);
		}

		Ok(TokenClientOptions {
			client_id: self.client_id,
			client_secret: TokenSecret::new(self.client_secret),
			authority: self.authority,
			token_endpoint: self.token_endpoint,
			discovery_policy: self.discovery_policy.unwrap_or_default(),
			grant_type: self.grant_type,
			scope: self.scope,
			extra_params: self.extra_params,
			caching,
			cache_backend: self.cache_backend,
			failure_policy: self.failure_policy,
			events: self.events,
		})
	}
}
impl Debug for TokenClientOptionsBuilder {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenClientOptionsBuilder")
			.field("client_id", &self.client_id)
			.field("authority", &self.authority)
			.field("token_endpoint", &self.token_endpoint)
			.finish()
	}
}

/// Shared plumbing behind every upstream-fetching grant provider.
///
/// Owns the engine, the endpoint resolver, and the transport handles; grant
/// modules contribute only their key and form parameters.
#[derive(Debug)]
pub struct ProviderCore {
	engine: AcquisitionEngine,
	context: Arc<FetchContext>,
}
impl ProviderCore {
	/// Assembles the core for one grant kind.
	///
	/// Re-validates the endpoint and cache backend requirements so options
	/// constructed without the builder still fail fast.
	pub fn new(
		grant: GrantKind,
		options: TokenClientOptions,
		transport: Arc<dyn TokenTransport>,
		fetcher: Arc<dyn DiscoveryFetcher>,
	) -> Result<Self, ConfigError> {
		let resolver = if let Some(endpoint) = &options.token_endpoint {
			TokenEndpointResolver::static_endpoint(endpoint.clone())
		} else if let Some(authority) = &options.authority {
			TokenEndpointResolver::from_authority(
				authority.clone(),
				options.discovery_policy.clone(),
			)
		} else {
			return Err(ConfigError::MissingEndpoint);
		};
		let cache = if options.caching.enabled {
			let backend = options.cache_backend.clone().ok_or(ConfigError::MissingCacheBackend)?;

			Some(TokenCacheStore::new(backend, options.caching.clone()))
		} else {
			None
		};
		let engine = AcquisitionEngine::new(grant, cache, options.events.clone())
			.with_failure_policy(options.failure_policy);
		let context = Arc::new(FetchContext {
			client_id: options.client_id,
			client_secret: options.client_secret,
			grant_type: options.grant_type,
			scope: options.scope,
			extra_params: options.extra_params,
			resolver,
			transport,
			fetcher,
		});

		Ok(Self { engine, context })
	}

	/// Acquires a token for `key`, fetching with the grant-specific form
	/// parameters on a cache miss.
	pub(crate) async fn acquire(
		&self,
		key: CacheKey,
		default_grant_type: &'static str,
		grant_params: Vec<(String, String)>,
	) -> Result<TokenResult> {
		let context = self.context.clone();

		self.engine
			.get_token(key, move || {
				Box::pin(async move { context.fetch(default_grant_type, grant_params).await })
			})
			.await
	}
}

struct FetchContext {
	client_id: String,
	client_secret: TokenSecret,
	grant_type: Option<String>,
	scope: Option<String>,
	extra_params: Vec<(String, String)>,
	resolver: TokenEndpointResolver,
	transport: Arc<dyn TokenTransport>,
	fetcher: Arc<dyn DiscoveryFetcher>,
}
impl FetchContext {
	async fn fetch(
		&self,
		default_grant_type: &'static str,
		grant_params: Vec<(String, String)>,
	) -> FetchOutcome {
		let endpoint = self.resolver.resolve(self.fetcher.as_ref()).await?;
		let mut request = TokenRequest::new(endpoint)
			.with_param("grant_type", self.grant_type.as_deref().unwrap_or(default_grant_type))
			.with_param("client_id", &self.client_id)
			.with_param("client_secret", self.client_secret.expose());

		if let Some(scope) = &self.scope {
			request = request.with_param("scope", scope);
		}
		for (name, value) in grant_params.into_iter().chain(self.extra_params.iter().cloned()) {
			request = request.with_param(name, value);
		}

		Ok(self.transport.request_token(&request).await)
	}
}
impl Debug for FetchContext {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("FetchContext")
			.field("client_id", &self.client_id)
			.field("grant_type", &self.grant_type)
			.field("scope", &self.scope)
			.field("resolver", &self.resolver)
			.finish()
	}
}

/// Extracts the bearer secret from a settled acquisition, degrading error
/// tokens to `None`.
pub(crate) fn secret_from(token: TokenResult) -> Option<TokenSecret> {
	if token.is_error() { None } else { token.access_token }
}
