//! Token (de)serialization and TTL application over an external byte cache.

// self
use crate::{
	_prelude::*,
	cache::{CacheBackend, CacheKey, CachingPolicy},
	obs,
	token::TokenResult,
};

/// Token-aware wrapper over a [`CacheBackend`].
///
/// The store persists the raw token payload bytes and re-parses them on read,
/// so a cached token is indistinguishable from a freshly fetched one. Backend
/// failures and malformed entries degrade to cache misses; a cache problem
/// must never fail an acquisition.
#[derive(Clone)]
pub struct TokenCacheStore {
	backend: Arc<dyn CacheBackend>,
	policy: CachingPolicy,
}
impl TokenCacheStore {
	/// Creates a store over the provided backend and policy.
	pub fn new(backend: Arc<dyn CacheBackend>, policy: CachingPolicy) -> Self {
		Self { backend, policy }
	}

	/// Returns the caching policy this store applies.
	pub fn policy(&self) -> &CachingPolicy {
		&self.policy
	}

	/// Reads the token cached under `key`.
	///
	/// Backend failures and malformed payloads are logged and reported as
	/// misses so the caller falls back to a fresh fetch.
	pub async fn get(&self, key: &CacheKey) -> Option<TokenResult> {
		let prefixed = self.policy.prefixed_key(key);
		let bytes = match self.backend.get_bytes(&prefixed).await {
			Ok(Some(bytes)) => bytes,
			Ok(None) => {
				obs::record_cache_lookup(obs::CacheLookup::Miss);

				return None;
			},
			Err(error) => {
				obs::warn_cache("read", &error.to_string());
				obs::record_cache_lookup(obs::CacheLookup::Error);

				return None;
			},
		};

		match TokenResult::from_payload(&bytes) {
			Ok(token) => {
				obs::record_cache_lookup(obs::CacheLookup::Hit);

				Some(token)
			},
			Err(error) => {
				obs::warn_cache("parse", &error.to_string());
				obs::record_cache_lookup(obs::CacheLookup::Error);

				None
			},
		}
	}

	/// Writes a successful token under `key` with an absolute expiry derived
	/// from the policy.
	///
	/// Error tokens and tokens whose remaining lifetime falls inside the
	/// expiration delay are silently skipped. Backend write failures are
	/// logged and swallowed; the caller already holds the token.
	pub async fn set(&self, key: &CacheKey, token: &TokenResult) {
		if token.is_error() {
			return;
		}

		let Some(ttl) = self.policy.ttl_for(token) else {
			return;
		};
		let prefixed = self.policy.prefixed_key(key);
		let expires_at = OffsetDateTime::now_utc().saturating_add(ttl);

		if let Err(error) = self.backend.set_bytes(&prefixed, token.raw.clone(), expires_at).await {
			obs::warn_cache("write", &error.to_string());
		}
	}
}
impl Debug for TokenCacheStore {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenCacheStore").field("policy", &self.policy).finish()
	}
}
