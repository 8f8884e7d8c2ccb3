use std::fmt;
use std::sync::Arc;

use crate::entry::Entry;
use crate::guard::ResourceRef;
use crate::traits::ResourceFactory;

/// Tracked, move-only reference to a cached resource.
///
/// A handle registers itself with its cache entry when it is created and
/// deregisters when it is dropped. Moving a handle moves the registration
/// with it; assigning over a handle drops (and deregisters) the old one.
/// Handles are deliberately not `Clone`: ask the cache for another one with
/// [`ResourceCache::get`](crate::ResourceCache::get) instead.
///
/// When the cache recreates the resource behind a handle's key, the handle
/// sees the new resource on its next read. A handle never owns the resource
/// and cannot release it.
///
/// ```compile_fail
/// use resource_cache::{ResourceCache, ResourceFactory};
///
/// struct Id;
///
/// impl ResourceFactory for Id {
///     type Key = u8;
///     type Resource = u8;
///     type Error = std::convert::Infallible;
///
///     fn create(&self, key: &u8) -> Result<u8, Self::Error> {
///         Ok(*key)
///     }
/// }
///
/// let cache = ResourceCache::new(Id);
/// let handle = cache.get(&1).unwrap();
/// let copy = handle.clone(); // handles are move-only
/// ```
pub struct Handle<F: ResourceFactory> {
	entry: Arc<Entry<F::Key, F::Resource>>,
}

impl<F: ResourceFactory> Handle<F> {
	pub(crate) fn register(entry: Arc<Entry<F::Key, F::Resource>>) -> Self {
		entry.register();
		Self {
			entry,
		}
	}

	/// Borrow the current resource without blocking.
	///
	/// A reload of this key while the guard is alive does not wait for it; the
	/// guard keeps the resource it loaded and the next `get` sees the new one.
	pub fn get(&self) -> ResourceRef<F::Resource> {
		ResourceRef::new(self.entry.read())
	}

	/// Clone the `Arc` of the current resource. Safe to hold across reloads;
	/// the clone keeps pointing at the resource that was current when it was
	/// taken.
	pub fn get_arc(&self) -> Arc<F::Resource> {
		self.entry.resource_arc()
	}

	/// Key this handle was obtained for.
	pub fn key(&self) -> &F::Key {
		&self.entry.key
	}

	/// Number of successful recreations of this key so far.
	pub fn generation(&self) -> u64 {
		self.entry.generation()
	}

	/// Whether both handles track the same cache entry.
	pub fn same_entry(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.entry, &other.entry)
	}
}

impl<F: ResourceFactory> Drop for Handle<F> {
	fn drop(&mut self) {
		self.entry.deregister();
	}
}

impl<F: ResourceFactory> fmt::Debug for Handle<F> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Handle")
			.field("key", &self.entry.key)
			.field("generation", &self.entry.generation())
			.finish()
	}
}
