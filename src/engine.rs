//! Core acquisition pipeline shared by every grant.
//!
//! Each call first consults the cache store (when configured), then joins or
//! starts a single-flight wave for its cache key. The wave owns event dispatch
//! and metric recording, so hooks fire once per upstream fetch no matter how
//! many callers coalesced onto it. Cache write-back happens on the caller side
//! after the wave settles and is idempotent across coalesced callers.

// crates.io
use futures_util::future::BoxFuture;
// self
use crate::{
	_prelude::*,
	cache::{CacheKey, TokenCacheStore},
	discovery::DiscoveryError,
	events::TokenEvents,
	obs::{AcquisitionOutcome, AcquisitionSpan, GrantKind},
	singleflight::SingleFlightRegistry,
	token::TokenResult,
};

/// Outcome of a single fetch wave, shared by every coalesced caller.
///
/// OAuth error responses are `Ok` values carrying an error token; only
/// discovery failures surface as `Err`.
pub type FetchOutcome = Result<TokenResult, DiscoveryError>;
/// Boxed fetch future handed to the engine by a grant strategy.
pub type FetchFuture = BoxFuture<'static, FetchOutcome>;

/// How an engine surfaces OAuth error responses to its caller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicy {
	/// Returns the error token so the caller can proceed unauthenticated.
	///
	/// This is the outbound-handler posture: a failed acquisition downgrades
	/// the outgoing request instead of failing it.
	#[default]
	Degrade,
	/// Raises [`Error::Retrieval`] carrying the endpoint's error code.
	Propagate,
}

/// Cache-then-coalesce token acquisition engine.
pub struct AcquisitionEngine {
	grant: GrantKind,
	cache: Option<TokenCacheStore>,
	events: TokenEvents,
	failure_policy: FailurePolicy,
	registry: SingleFlightRegistry<FetchOutcome>,
}
impl AcquisitionEngine {
	/// Creates an engine for one grant strategy.
	///
	/// Passing `None` for the cache disables caching entirely; concurrent
	/// callers still coalesce onto a single upstream fetch.
	pub fn new(grant: GrantKind, cache: Option<TokenCacheStore>, events: TokenEvents) -> Self {
		Self {
			grant,
			cache,
			events,
			failure_policy: FailurePolicy::default(),
			registry: SingleFlightRegistry::new(),
		}
	}

	/// Sets how OAuth error responses surface to the caller.
	pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
		self.failure_policy = policy;

		self
	}

	/// Returns the configured cache store, if any.
	pub fn cache(&self) -> Option<&TokenCacheStore> {
		self.cache.as_ref()
	}

	/// Returns a token for `key`, serving fresh cache hits directly and
	/// funneling concurrent misses into one upstream fetch.
	pub async fn get_token(
		&self,
		key: CacheKey,
		factory: impl FnOnce() -> FetchFuture,
	) -> Result<TokenResult> {
		let span = AcquisitionSpan::new(self.grant, "get_token");

		span.instrument(self.get_token_uninstrumented(key, factory)).await
	}

	async fn get_token_uninstrumented(
		&self,
		key: CacheKey,
		factory: impl FnOnce() -> FetchFuture,
	) -> Result<TokenResult> {
		if let Some(cache) = &self.cache
			&& let Some(token) = cache.get(&key).await
		{
			return Ok(token);
		}

		crate::obs::record_acquisition_outcome(self.grant, AcquisitionOutcome::Attempt);

		let lease = self
			.registry
			.acquire(key.clone(), || Self::wave(self.grant, self.events.clone(), factory()));
		let outcome = lease.settle().await;

		if let Some(cache) = &self.cache
			&& let Ok(token) = &outcome
		{
			cache.set(&key, token).await;
		}

		let token = outcome?;

		if token.is_error() && self.failure_policy == FailurePolicy::Propagate {
			return Err(Error::Retrieval {
				error: token.error.clone().unwrap_or_default(),
				description: token.error_description.clone().unwrap_or_default(),
			});
		}

		Ok(token)
	}

	// Wraps a raw fetch so events and metrics settle with the wave itself,
	// exactly once, even when the initiating caller has been cancelled.
	fn wave(grant: GrantKind, events: TokenEvents, fetch: FetchFuture) -> FetchFuture {
		Box::pin(async move {
			let outcome = fetch.await;

			match &outcome {
				Ok(token) if !token.is_error() => {
					crate::obs::record_acquisition_outcome(grant, AcquisitionOutcome::Success);
					events.token_acquired(token).await;
				},
				Ok(token) => {
					crate::obs::record_acquisition_outcome(grant, AcquisitionOutcome::Failure);
					events.token_request_failed(token).await;
				},
				Err(_) =>
					crate::obs::record_acquisition_outcome(grant, AcquisitionOutcome::Failure),
			}

			outcome
		})
	}
}
impl Debug for AcquisitionEngine {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AcquisitionEngine")
			.field("grant", &self.grant)
			.field("cache", &self.cache)
			.field("events", &self.events)
			.field("failure_policy", &self.failure_policy)
			.finish()
	}
}
