//! Cache activity counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of a cache's activity.
///
/// # Example
///
/// ```
/// use resource_cache::{ResourceCache, ResourceFactory};
///
/// struct Square;
///
/// impl ResourceFactory for Square {
///     type Key = u64;
///     type Resource = u64;
///     type Error = std::convert::Infallible;
///
///     fn create(&self, key: &u64) -> Result<u64, Self::Error> {
///         Ok(key * key)
///     }
/// }
///
/// let cache = ResourceCache::new(Square);
/// let first = cache.get(&4).unwrap();
/// let second = cache.get(&4).unwrap();
///
/// let metrics = cache.metrics();
/// assert_eq!(metrics.creations, 1);
/// assert_eq!(metrics.hits, 1);
/// assert_eq!(metrics.live_handles, 2);
/// # drop((first, second));
/// ```
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheMetrics {
	/// Lookups answered by an existing entry.
	pub hits: u64,
	/// Lookups that had to call the factory.
	pub misses: u64,
	/// Entries created by `get`.
	pub creations: u64,
	/// Factory failures during `get`.
	pub create_failures: u64,
	/// Successful recreations.
	pub recreations: u64,
	/// Factory failures during recreation (old resource kept).
	pub recreate_failures: u64,
	/// Current number of entries.
	pub entry_count: usize,
	/// Handles currently registered across all entries.
	pub live_handles: usize,
}

impl CacheMetrics {
	/// Hit rate as a ratio between 0.0 and 1.0.
	///
	/// Returns 0.0 if there have been no lookups.
	pub fn hit_rate(&self) -> f64 {
		let total = self.hits + self.misses;
		if total == 0 {
			0.0
		} else {
			self.hits as f64 / total as f64
		}
	}
}

/// Live counters owned by a cache.
#[derive(Default)]
pub(crate) struct Counters {
	pub hits: AtomicU64,
	pub misses: AtomicU64,
	pub creations: AtomicU64,
	pub create_failures: AtomicU64,
	pub recreations: AtomicU64,
	pub recreate_failures: AtomicU64,
}

impl Counters {
	#[inline]
	pub fn bump(counter: &AtomicU64) {
		counter.fetch_add(1, Ordering::Relaxed);
	}

	pub fn snapshot(&self, entry_count: usize, live_handles: usize) -> CacheMetrics {
		CacheMetrics {
			hits: self.hits.load(Ordering::Relaxed),
			misses: self.misses.load(Ordering::Relaxed),
			creations: self.creations.load(Ordering::Relaxed),
			create_failures: self.create_failures.load(Ordering::Relaxed),
			recreations: self.recreations.load(Ordering::Relaxed),
			recreate_failures: self.recreate_failures.load(Ordering::Relaxed),
			entry_count,
			live_handles,
		}
	}
}
