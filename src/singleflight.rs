//! Exact-key de-duplication of concurrent token fetches.
//!
//! The registry maps a [`CacheKey`] to the shared future of the fetch that is
//! currently in flight for it. Every caller of the same wave awaits the same
//! shared future and therefore observes the identical outcome; a caller that
//! is dropped mid-wave stops waiting, but the remaining waiters keep driving
//! the fetch to completion. An entry is purely a coalescing mechanism for one
//! wave of concurrent demand, never a cache: the lease returned by
//! [`SingleFlightRegistry::acquire`] removes it again on drop, on every exit
//! path.

// crates.io
use futures_util::{
	FutureExt,
	future::{BoxFuture, Shared},
};
// self
use crate::{_prelude::*, cache::CacheKey};

type SharedFetch<T> = Shared<BoxFuture<'static, T>>;
type EntryMap<T> = Arc<Mutex<HashMap<CacheKey, SharedFetch<T>>>>;

/// Registry of in-flight fetches, keyed by exact cache key.
pub struct SingleFlightRegistry<T>
where
	T: Clone,
{
	entries: EntryMap<T>,
}
impl<T> SingleFlightRegistry<T>
where
	T: 'static + Clone + Send,
{
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self { entries: Default::default() }
	}

	/// Joins the in-flight fetch for `key`, starting one via `factory` if none
	/// exists.
	///
	/// Registration is atomic under one registry-wide lock, so two callers
	/// racing on the same key can never both invoke `factory`. Distinct keys
	/// never contend beyond that map lock. The returned lease must be held
	/// until the caller is done with the wave; dropping it releases the entry.
	pub fn acquire(
		&self,
		key: CacheKey,
		factory: impl FnOnce() -> BoxFuture<'static, T>,
	) -> InFlightLease<T> {
		let shared = {
			let mut entries = self.entries.lock();

			entries.entry(key.clone()).or_insert_with(|| factory().shared()).clone()
		};

		InFlightLease { entries: Arc::clone(&self.entries), key, shared }
	}

	/// Returns the number of fetches currently registered.
	pub fn in_flight(&self) -> usize {
		self.entries.lock().len()
	}
}
impl<T> Default for SingleFlightRegistry<T>
where
	T: 'static + Clone + Send,
{
	fn default() -> Self {
		Self::new()
	}
}
impl<T> Debug for SingleFlightRegistry<T>
where
	T: Clone,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SingleFlightRegistry").field("in_flight", &self.entries.lock().len()).finish()
	}
}

/// One caller's handle on an in-flight fetch.
///
/// Dropping the lease removes the registry entry so the next wave always
/// triggers a fresh fetch, but only while the entry still belongs to this
/// lease's wave: a straggling lease from an earlier wave never evicts a
/// successor's in-flight fetch.
pub struct InFlightLease<T>
where
	T: Clone,
{
	entries: EntryMap<T>,
	key: CacheKey,
	shared: SharedFetch<T>,
}
impl<T> InFlightLease<T>
where
	T: Clone,
{
	/// Awaits the wave's shared outcome.
	pub async fn settle(&self) -> T {
		self.shared.clone().await
	}
}
impl<T> Drop for InFlightLease<T>
where
	T: Clone,
{
	fn drop(&mut self) {
		let mut entries = self.entries.lock();

		if entries.get(&self.key).is_some_and(|current| current.ptr_eq(&self.shared)) {
			entries.remove(&self.key);
		}
	}
}
impl<T> Debug for InFlightLease<T>
where
	T: Clone,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("InFlightLease").field("key", &self.key).finish()
	}
}
