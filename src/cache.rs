//! Generic keyed TTL cache with lazy per-entry expiry.
//!
//! The cache holds only caller-independent data (the pre-filter client list and
//! per-client detail records); visibility filtering always happens per request on
//! top of whatever the cache returns.

// std
use std::{collections::HashMap, hash::Hash};
// crates.io
use tokio::sync::RwLock;
// self
use crate::_prelude::*;

/// A cached value together with its expiry deadline.
#[derive(Clone, Debug)]
pub struct CacheEntry<T> {
	/// Stored value.
	pub value: T,
	/// Monotonic deadline after which the entry is treated as absent.
	pub expires_at: Instant,
}
impl<T> CacheEntry<T> {
	/// Whether the entry has passed its expiry deadline.
	pub fn is_expired(&self, now: Instant) -> bool {
		now >= self.expires_at
	}
}

/// Shared in-memory store with per-entry time-to-live.
///
/// Expired entries are indistinguishable from absent ones; they are purged lazily
/// when a lookup encounters them. `insert` overwrites unconditionally, so two
/// concurrent writers for the same key race with last-write-wins and no ordering
/// guarantee.
#[derive(Debug)]
pub struct TtlCache<K, V> {
	entries: Arc<RwLock<HashMap<K, CacheEntry<V>>>>,
}
impl<K, V> TtlCache<K, V>
where
	K: Eq + Hash + Clone,
	V: Clone,
{
	/// Create an empty cache.
	pub fn new() -> Self {
		Self { entries: Arc::new(RwLock::new(HashMap::new())) }
	}

	/// Retrieve a clone of the value for `key`, treating expired entries as absent.
	pub async fn get(&self, key: &K) -> Option<V> {
		let now = Instant::now();

		{
			let entries = self.entries.read().await;

			match entries.get(key) {
				Some(entry) if !entry.is_expired(now) => return Some(entry.value.clone()),
				Some(_) => {},
				None => return None,
			}
		}

		// Lazy purge; correctness does not depend on the entry actually being removed.
		let mut entries = self.entries.write().await;

		if entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
			entries.remove(key);
		}

		None
	}

	/// Store `value` under `key` for `ttl`, overwriting any previous entry.
	pub async fn insert(&self, key: K, value: V, ttl: Duration) {
		let entry = CacheEntry { value, expires_at: Instant::now() + ttl };

		self.entries.write().await.insert(key, entry);
	}

	/// Number of entries currently stored, expired ones included.
	pub async fn len(&self) -> usize {
		self.entries.read().await.len()
	}

	/// Whether the cache currently stores no entries at all.
	pub async fn is_empty(&self) -> bool {
		self.entries.read().await.is_empty()
	}
}
impl<K, V> Default for TtlCache<K, V>
where
	K: Eq + Hash + Clone,
	V: Clone,
{
	fn default() -> Self {
		Self::new()
	}
}
impl<K, V> Clone for TtlCache<K, V> {
	fn clone(&self) -> Self {
		Self { entries: self.entries.clone() }
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use tokio::time;
	// self
	use super::*;

	#[tokio::test(start_paused = true)]
	async fn get_returns_value_before_expiry() {
		let cache = TtlCache::new();

		cache.insert("k", 1_u32, Duration::from_secs(60)).await;

		assert_eq!(cache.get(&"k").await, Some(1));
	}

	#[tokio::test(start_paused = true)]
	async fn expired_entry_is_absent_and_purged() {
		let cache = TtlCache::new();

		cache.insert("k", 1_u32, Duration::from_secs(60)).await;
		time::advance(Duration::from_secs(61)).await;

		assert_eq!(cache.get(&"k").await, None);
		assert!(cache.is_empty().await);
	}

	#[tokio::test(start_paused = true)]
	async fn entry_expires_exactly_at_deadline() {
		let cache = TtlCache::new();

		cache.insert("k", 1_u32, Duration::from_secs(60)).await;
		time::advance(Duration::from_secs(60)).await;

		assert_eq!(cache.get(&"k").await, None);
	}

	#[tokio::test(start_paused = true)]
	async fn insert_overwrites_previous_value() {
		let cache = TtlCache::new();

		cache.insert("k", 1_u32, Duration::from_secs(1)).await;
		cache.insert("k", 2_u32, Duration::from_secs(60)).await;
		time::advance(Duration::from_secs(30)).await;

		assert_eq!(cache.get(&"k").await, Some(2));
		assert_eq!(cache.len().await, 1);
	}

	#[tokio::test(start_paused = true)]
	async fn unknown_key_is_absent() {
		let cache = TtlCache::<&str, u32>::new();

		assert_eq!(cache.get(&"missing").await, None);
	}

	#[tokio::test(start_paused = true)]
	async fn clones_share_one_store() {
		let cache = TtlCache::new();
		let alias = cache.clone();

		cache.insert("k", 7_u32, Duration::from_secs(60)).await;

		assert_eq!(alias.get(&"k").await, Some(7));
	}
}
