//! Per-instance caching policy and the cache TTL computation.

// self
use crate::{_prelude::*, cache::CacheKey, token::TokenResult};

/// Caching behavior attached to one relay instance; immutable once the engine
/// is constructed.
#[derive(Clone, Debug)]
pub struct CachingPolicy {
	/// Whether cached tokens are served at all; `false` bypasses the store
	/// entirely and every acquisition goes upstream.
	pub enabled: bool,
	/// Upper bound for any cache entry lifetime. Defaults to [`Duration::MAX`],
	/// i.e. entries live as long as the token itself remains usable.
	pub cache_duration: Duration,
	/// Safety margin subtracted from the token lifetime so an entry never
	/// outlives the token's usefulness at the downstream API. Defaults to one
	/// minute.
	pub expiration_delay: Duration,
	/// Prefix applied to every stored key.
	pub key_prefix: String,
	/// Relay instance name folded into the stored key to keep instances with
	/// different credentials from sharing tokens.
	pub client_name: String,
}
impl CachingPolicy {
	/// Default safety margin between cache expiry and token expiry.
	pub const DEFAULT_EXPIRATION_DELAY: Duration = Duration::seconds(60);

	/// Creates a policy with caching enabled and default bounds.
	pub fn enabled() -> Self {
		Self { enabled: true, ..Self::default() }
	}

	/// Overrides the maximum cache entry lifetime.
	pub fn with_cache_duration(mut self, duration: Duration) -> Self {
		self.cache_duration = duration;

		self
	}

	/// Overrides the expiration safety margin.
	pub fn with_expiration_delay(mut self, delay: Duration) -> Self {
		self.expiration_delay = delay;

		self
	}

	/// Sets the stored-key prefix.
	pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.key_prefix = prefix.into();

		self
	}

	/// Sets the relay instance name folded into stored keys.
	pub fn with_client_name(mut self, name: impl Into<String>) -> Self {
		self.client_name = name.into();

		self
	}

	/// Renders the backend key for a logical cache key under this policy.
	pub fn prefixed_key(&self, key: &CacheKey) -> String {
		format!("{}{}:{key}", self.key_prefix, self.client_name)
	}

	/// Computes the cache TTL for a token under this policy, `None` meaning
	/// "do not cache".
	pub fn ttl_for(&self, token: &TokenResult) -> Option<Duration> {
		cache_ttl(token.expires_in?, self.expiration_delay, self.cache_duration)
	}
}
impl Default for CachingPolicy {
	fn default() -> Self {
		Self {
			enabled: false,
			cache_duration: Duration::MAX,
			expiration_delay: Self::DEFAULT_EXPIRATION_DELAY,
			key_prefix: String::new(),
			client_name: String::new(),
		}
	}
}

/// Computes how long a token may sit in the cache.
///
/// The reported lifetime is shortened by `expiration_delay` so a cached token
/// is never served right at the edge of its validity; a token that would
/// expire within the delay window is not worth caching at all. The result is
/// additionally capped by `cache_duration`.
pub fn cache_ttl(
	expires_in_secs: i64,
	expiration_delay: Duration,
	cache_duration: Duration,
) -> Option<Duration> {
	let adjusted = Duration::seconds(expires_in_secs).checked_sub(expiration_delay)?;

	if adjusted <= Duration::ZERO {
		return None;
	}

	Some(adjusted.min(cache_duration))
}
