//! Cache contracts: the external byte-cache seam, logical cache keys, caching
//! policy, and the token store built on top of them.

pub mod memory;
pub mod policy;
pub mod store;

pub use memory::MemoryCache;
pub use policy::CachingPolicy;
pub use store::TokenCacheStore;

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD_NO_PAD};
use sha2::{Digest, Sha512};
// self
use crate::_prelude::*;

/// Boxed future returned by [`CacheBackend`] operations.
pub type CacheFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, CacheError>> + 'a + Send>>;

/// Byte-oriented distributed cache contract the relay delegates storage to.
///
/// Implementations own consistency; the relay only requires last-write-wins
/// semantics and absolute-expiry eviction. Transient backend failures surface
/// as [`CacheError`] and are absorbed by [`TokenCacheStore`] so they can never
/// fail an acquisition that already has its token.
pub trait CacheBackend
where
	Self: Send + Sync,
{
	/// Reads the bytes stored under `key`, if any.
	fn get_bytes<'a>(&'a self, key: &'a str) -> CacheFuture<'a, Option<Vec<u8>>>;

	/// Stores `value` under `key` until the absolute `expires_at` instant.
	fn set_bytes<'a>(
		&'a self,
		key: &'a str,
		value: Vec<u8>,
		expires_at: OffsetDateTime,
	) -> CacheFuture<'a, ()>;
}

/// Error type produced by [`CacheBackend`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum CacheError {
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Logical token identity used for cache lookups and fetch de-duplication.
///
/// Two identities that must not share a token always map to distinct keys; the
/// same identity under the same configuration always maps to the same key. The
/// grant-specific constructors namespace the key space; [`CachingPolicy`]
/// additionally prefixes the stored form with the configured prefix and client
/// name so instances never collide in a shared cache.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey(String);
impl CacheKey {
	/// Constant key for the client-credentials grant; the client is the identity.
	pub fn client_credentials() -> Self {
		Self("client_credentials".into())
	}

	/// Key for the password grant, namespaced per username.
	pub fn password(username: &str) -> Self {
		Self(format!("password:{username}"))
	}

	/// Key for the refresh-token grant.
	///
	/// The refresh token is itself a secret, so the key carries a base64
	/// (no padding) SHA-512 digest instead of the raw value.
	pub fn refresh_token(refresh_token: &str) -> Self {
		let digest = Sha512::digest(refresh_token.as_bytes());

		Self(format!("refresh_token:{}", STANDARD_NO_PAD.encode(digest)))
	}

	/// Key for the delegation grant, namespaced per inbound access token.
	pub fn delegation(inbound_token: &str) -> Self {
		Self(format!("delegation:{inbound_token}"))
	}

	/// Returns the key's string form without any instance prefix.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl Display for CacheKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
