//! Thread-safe in-memory [`CacheBackend`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	cache::{CacheBackend, CacheFuture},
};

type CacheMap = Arc<RwLock<HashMap<String, MemoryEntry>>>;

#[derive(Clone, Debug)]
struct MemoryEntry {
	value: Vec<u8>,
	expires_at: OffsetDateTime,
}

/// Thread-safe cache backend that keeps entries in-process for tests and demos.
#[derive(Clone, Debug, Default)]
pub struct MemoryCache(CacheMap);
impl MemoryCache {
	/// Creates an empty cache.
	pub fn new() -> Self {
		Self::default()
	}

	fn get_now(map: CacheMap, key: String, now: OffsetDateTime) -> Option<Vec<u8>> {
		let mut guard = map.write();

		match guard.get(&key) {
			Some(entry) if entry.expires_at > now => Some(entry.value.clone()),
			Some(_) => {
				guard.remove(&key);

				None
			},
			None => None,
		}
	}

	fn set_now(map: CacheMap, key: String, value: Vec<u8>, expires_at: OffsetDateTime) {
		map.write().insert(key, MemoryEntry { value, expires_at });
	}

	/// Returns the number of live entries, expired ones included until pruned.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns `true` when no entries are stored.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}
}
impl CacheBackend for MemoryCache {
	fn get_bytes<'a>(&'a self, key: &'a str) -> CacheFuture<'a, Option<Vec<u8>>> {
		let map = self.0.clone();
		let key = key.to_owned();

		Box::pin(async move { Ok(Self::get_now(map, key, OffsetDateTime::now_utc())) })
	}

	fn set_bytes<'a>(
		&'a self,
		key: &'a str,
		value: Vec<u8>,
		expires_at: OffsetDateTime,
	) -> CacheFuture<'a, ()> {
		let map = self.0.clone();
		let key = key.to_owned();

		Box::pin(async move {
			Self::set_now(map, key, value, expires_at);

			Ok(())
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn entries_round_trip_until_expiry() {
		let cache = MemoryCache::default();
		let soon = OffsetDateTime::now_utc() + Duration::minutes(5);

		cache
			.set_bytes("k", b"payload".to_vec(), soon)
			.await
			.expect("Memory cache writes should succeed.");

		assert_eq!(
			cache.get_bytes("k").await.expect("Memory cache reads should succeed."),
			Some(b"payload".to_vec()),
		);
	}

	#[tokio::test]
	async fn expired_entries_read_as_misses_and_are_pruned() {
		let cache = MemoryCache::default();
		let past = OffsetDateTime::now_utc() - Duration::seconds(1);

		cache
			.set_bytes("k", b"stale".to_vec(), past)
			.await
			.expect("Memory cache writes should succeed.");

		assert_eq!(
			cache.get_bytes("k").await.expect("Memory cache reads should succeed."),
			None,
		);
		assert!(cache.is_empty(), "Expired entries should be pruned on read.");
	}

	#[tokio::test]
	async fn last_write_wins() {
		let cache = MemoryCache::default();
		let soon = OffsetDateTime::now_utc() + Duration::minutes(5);

		cache.set_bytes("k", b"one".to_vec(), soon).await.expect("First write should succeed.");
		cache.set_bytes("k", b"two".to_vec(), soon).await.expect("Second write should succeed.");

		assert_eq!(
			cache.get_bytes("k").await.expect("Memory cache reads should succeed."),
			Some(b"two".to_vec()),
		);
	}
}
