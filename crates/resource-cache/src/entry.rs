use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use arc_swap::{ArcSwap, Guard};

/// One cached resource and the bookkeeping for the handles that reference it.
///
/// Handles share the entry through an `Arc`, so swapping `resource` repoints
/// every handle at once. The swap is atomic and never waits for readers. A
/// reader that loaded the resource before a swap keeps the old object alive
/// until its guard drops.
pub(crate) struct Entry<K, R> {
	/// Fingerprint of `key`, computed once at insertion.
	pub hash: u64,
	/// Construction parameters. Never mutated after insertion.
	pub key: K,
	/// Current resource for `key`.
	resource: ArcSwap<R>,
	/// Registered handles.
	live: AtomicUsize,
	/// Bumped on every successful recreate.
	generation: AtomicU64,
}

impl<K, R> Entry<K, R> {
	pub fn new(hash: u64, key: K, resource: R) -> Self {
		Self {
			hash,
			key,
			resource: ArcSwap::from_pointee(resource),
			live: AtomicUsize::new(0),
			generation: AtomicU64::new(0),
		}
	}

	/// Load the current resource without blocking.
	pub fn read(&self) -> Guard<Arc<R>> {
		self.resource.load()
	}

	/// Clone the `Arc` of the current resource (not the resource itself).
	pub fn resource_arc(&self) -> Arc<R> {
		self.resource.load_full()
	}

	/// Swap in a rebuilt resource and return the previous one.
	///
	/// The previous resource is released when the returned `Arc` and every
	/// outstanding clone of it are dropped.
	pub fn replace(&self, resource: R) -> Arc<R> {
		let previous = self.resource.swap(Arc::new(resource));
		self.generation.fetch_add(1, Ordering::Release);
		previous
	}

	pub fn generation(&self) -> u64 {
		self.generation.load(Ordering::Acquire)
	}

	pub fn register(&self) {
		self.live.fetch_add(1, Ordering::AcqRel);
	}

	pub fn deregister(&self) {
		let previous = self.live.fetch_sub(1, Ordering::AcqRel);
		debug_assert!(previous > 0, "handle deregistered from an entry with no live handles");
	}

	pub fn live(&self) -> usize {
		self.live.load(Ordering::Acquire)
	}
}
