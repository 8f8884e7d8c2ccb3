use std::borrow::Cow;
use std::sync::Arc;

use hashbrown::HashTable;
use parking_lot::Mutex;
use tracing::{debug, error, trace, warn};

use crate::builder::CacheBuilder;
use crate::entry::Entry;
use crate::handle::Handle;
use crate::hash::fingerprint;
use crate::metrics::{CacheMetrics, Counters};
use crate::report::ReloadReport;
use crate::traits::ResourceFactory;

type EntryArc<F> =
	Arc<Entry<<F as ResourceFactory>::Key, <F as ResourceFactory>::Resource>>;

/// Keyed cache holding exactly one live resource per key.
///
/// Resources are built lazily by the cache's [`ResourceFactory`] on the first
/// [`get`](Self::get) of a key. Every later `get` of an equal key returns a new
/// [`Handle`] to the same resource instance.
///
/// # Hot Reload
///
/// [`recreate`](Self::recreate) asks the factory to build the key again and, on
/// success, swaps the new resource into the entry. All live handles for the
/// key observe the new resource from their next read; the old one is released
/// once nothing borrows it any more. When the factory fails the entry keeps its
/// working resource: stale-but-valid wins over torn down.
///
/// # Lifetime Discipline
///
/// Entries are never evicted implicitly. They live until the cache is dropped
/// or [`purge_unused`](Self::purge_unused) is called. Dropping the cache while
/// any handle is still registered is a bug in the calling code and panics.
///
/// # Concurrency
///
/// The cache is designed to be driven from one thread. The table sits behind a
/// mutex and each entry's resource behind an atomically swapped `Arc`, so the
/// cache and its handles are `Send + Sync` when the resources are. Reading
/// through a handle never takes a lock. The factory runs with the table locked
/// and must not call back into the same cache.
pub struct ResourceCache<F: ResourceFactory> {
	/// Used in log events and the teardown panic.
	name: Cow<'static, str>,
	/// Builds resources for missed and recreated keys.
	factory: F,
	/// One entry per key.
	table: Mutex<HashTable<EntryArc<F>>>,
	/// Activity counters.
	counters: Counters,
}

impl<F: ResourceFactory> ResourceCache<F> {
	pub(crate) const DEFAULT_NAME: &'static str = "resources";

	/// Create an empty cache around `factory`.
	///
	/// Use [`CacheBuilder`] to set a name or pre-size the table.
	pub fn new(factory: F) -> Self {
		Self::from_parts(factory, Cow::Borrowed(Self::DEFAULT_NAME), 0)
	}

	/// Start configuring a cache.
	pub fn builder(factory: F) -> CacheBuilder<F> {
		CacheBuilder::new(factory)
	}

	pub(crate) fn from_parts(factory: F, name: Cow<'static, str>, capacity: usize) -> Self {
		Self {
			name,
			factory,
			table: Mutex::new(HashTable::with_capacity(capacity)),
			counters: Counters::default(),
		}
	}

	/// Return a handle to the resource for `key`, building it on a miss.
	///
	/// Two calls with equal keys observe the same resource instance until the
	/// key is recreated. If the factory fails, nothing is inserted and its
	/// error is returned.
	///
	/// # Runtime Complexity
	///
	/// Expected case: O(1) plus the factory call on a miss.
	pub fn get(&self, key: &F::Key) -> Result<Handle<F>, F::Error> {
		let hash = fingerprint(key);
		let mut table = self.table.lock();

		if let Some(entry) = table.find(hash, |entry| entry.key == *key) {
			Counters::bump(&self.counters.hits);
			trace!(cache = %self.name, ?key, "cache hit");
			return Ok(Handle::register(Arc::clone(entry)));
		}
		Counters::bump(&self.counters.misses);

		let resource = match self.factory.create(key) {
			Ok(resource) => resource,
			Err(err) => {
				Counters::bump(&self.counters.create_failures);
				warn!(cache = %self.name, ?key, error = %err, "failed to create resource");
				return Err(err);
			}
		};

		let entry = Arc::new(Entry::new(hash, key.clone(), resource));
		table.insert_unique(hash, Arc::clone(&entry), |entry| entry.hash);
		Counters::bump(&self.counters.creations);
		debug!(cache = %self.name, ?key, entries = table.len(), "created resource");

		Ok(Handle::register(entry))
	}

	/// Rebuild the resource for `key` and repoint every live handle at it.
	///
	/// Returns `Ok(false)` if the key has no entry, `Ok(true)` once the new
	/// resource is in place. On factory failure the existing resource and its
	/// handles are left untouched and the error is returned.
	///
	/// Outstanding [`ResourceRef`](crate::ResourceRef)s are not waited for;
	/// they keep the previous resource alive until they drop.
	pub fn recreate(&self, key: &F::Key) -> Result<bool, F::Error> {
		let hash = fingerprint(key);
		let table = self.table.lock();

		let Some(entry) = table.find(hash, |entry| entry.key == *key) else {
			trace!(cache = %self.name, ?key, "recreate skipped, no entry");
			return Ok(false);
		};

		self.recreate_entry(entry).map(|()| true)
	}

	/// Recreate every entry in the cache.
	///
	/// A failing key does not stop the pass. Order across keys is
	/// unspecified.
	pub fn recreate_all(&self) -> ReloadReport<F::Key, F::Error> {
		let table = self.table.lock();
		let mut report = ReloadReport::new();

		for entry in table.iter() {
			match self.recreate_entry(entry) {
				Ok(()) => report.push_recreated(entry.key.clone()),
				Err(err) => report.push_failure(entry.key.clone(), err),
			}
		}

		debug!(
			cache = %self.name,
			recreated = report.recreated().len(),
			failed = report.failures().len(),
			"recreated all resources"
		);
		report
	}

	/// Recreate every entry whose key matches `predicate`.
	///
	/// Used to reload only the resources affected by a change, for instance
	/// the shaders compiled from one file.
	pub fn recreate_where(
		&self,
		mut predicate: impl FnMut(&F::Key) -> bool,
	) -> ReloadReport<F::Key, F::Error> {
		let table = self.table.lock();
		let mut report = ReloadReport::new();

		for entry in table.iter().filter(|entry| predicate(&entry.key)) {
			match self.recreate_entry(entry) {
				Ok(()) => report.push_recreated(entry.key.clone()),
				Err(err) => report.push_failure(entry.key.clone(), err),
			}
		}
		report
	}

	fn recreate_entry(&self, entry: &EntryArc<F>) -> Result<(), F::Error> {
		match self.factory.create(&entry.key) {
			Ok(resource) => {
				let previous = entry.replace(resource);
				Counters::bump(&self.counters.recreations);
				debug!(
					cache = %self.name,
					key = ?entry.key,
					generation = entry.generation(),
					handles = entry.live(),
					"recreated resource"
				);
				// Released here unless a reader still holds a clone.
				drop(previous);
				Ok(())
			}
			Err(err) => {
				Counters::bump(&self.counters.recreate_failures);
				warn!(
					cache = %self.name,
					key = ?entry.key,
					error = %err,
					"failed to recreate resource, keeping previous"
				);
				Err(err)
			}
		}
	}

	/// Drop every entry that has no registered handle.
	///
	/// Returns the number of entries removed.
	pub fn purge_unused(&self) -> usize {
		let mut table = self.table.lock();
		let before = table.len();
		table.retain(|entry| entry.live() > 0);
		let removed = before - table.len();
		if removed > 0 {
			debug!(cache = %self.name, removed, "purged unused resources");
		}
		removed
	}

	/// Check whether `key` has an entry.
	pub fn contains(&self, key: &F::Key) -> bool {
		let hash = fingerprint(key);
		self.table.lock().find(hash, |entry| entry.key == *key).is_some()
	}

	/// Number of handles currently registered for `key` (0 if absent).
	pub fn live_handles(&self, key: &F::Key) -> usize {
		let hash = fingerprint(key);
		self.table.lock().find(hash, |entry| entry.key == *key).map_or(0, |entry| entry.live())
	}

	/// Clones of every key with an entry, in unspecified order.
	pub fn keys(&self) -> Vec<F::Key> {
		self.table.lock().iter().map(|entry| entry.key.clone()).collect()
	}

	/// Number of entries.
	pub fn len(&self) -> usize {
		self.table.lock().len()
	}

	/// Check if the cache has no entries.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Name given at construction.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// The factory building this cache's resources.
	pub fn factory(&self) -> &F {
		&self.factory
	}

	/// Get an activity snapshot.
	pub fn metrics(&self) -> CacheMetrics {
		let table = self.table.lock();
		let live: usize = table.iter().map(|entry| entry.live()).sum();
		self.counters.snapshot(table.len(), live)
	}
}

impl<F: ResourceFactory> Drop for ResourceCache<F> {
	fn drop(&mut self) {
		let table = self.table.get_mut();
		let outstanding: usize = table.iter().map(|entry| entry.live()).sum();
		if outstanding == 0 {
			return;
		}

		// Already unwinding: a second panic would abort the process.
		if std::thread::panicking() {
			error!(cache = %self.name, outstanding, "resource cache dropped with live handles");
			return;
		}

		let keys: Vec<String> = table
			.iter()
			.filter(|entry| entry.live() > 0)
			.map(|entry| format!("{:?} ({})", entry.key, entry.live()))
			.collect();
		panic!(
			"resource cache `{}` dropped with {} live handle(s) outstanding: {}",
			self.name,
			outstanding,
			keys.join(", ")
		);
	}
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

	use super::*;

	#[derive(Debug, PartialEq)]
	struct BuildError(u32);

	impl std::fmt::Display for BuildError {
		fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
			write!(f, "cannot build key {}", self.0)
		}
	}

	/// Builds `"<key>#<build number>"`, failing on demand.
	#[derive(Default)]
	struct Numbered {
		builds: AtomicUsize,
		fail: AtomicBool,
	}

	impl ResourceFactory for Numbered {
		type Key = u32;
		type Resource = String;
		type Error = BuildError;

		fn create(&self, key: &u32) -> Result<String, BuildError> {
			if self.fail.load(Ordering::Relaxed) {
				return Err(BuildError(*key));
			}
			let n = self.builds.fetch_add(1, Ordering::Relaxed);
			Ok(format!("{key}#{n}"))
		}
	}

	#[test]
	fn test_get_builds_once_per_key() {
		let cache = ResourceCache::new(Numbered::default());

		let a = cache.get(&1).expect("factory should succeed");
		let b = cache.get(&1).expect("factory should succeed");

		assert!(Arc::ptr_eq(&a.get_arc(), &b.get_arc()));
		assert!(a.same_entry(&b));
		assert_eq!(cache.factory().builds.load(Ordering::Relaxed), 1);
		assert_eq!(cache.len(), 1);
	}

	#[test]
	fn test_get_failure_inserts_nothing() {
		let cache = ResourceCache::new(Numbered::default());
		cache.factory().fail.store(true, Ordering::Relaxed);

		let err = cache.get(&5).expect_err("factory should fail");
		assert_eq!(err, BuildError(5));
		assert!(!cache.contains(&5));
		assert!(cache.is_empty());
		assert_eq!(cache.metrics().create_failures, 1);
	}

	#[test]
	fn test_recreate_absent_key_is_noop() {
		let cache = ResourceCache::new(Numbered::default());
		assert_eq!(cache.recreate(&9), Ok(false));
		assert!(cache.is_empty());
	}

	#[test]
	fn test_recreate_repoints_handles() {
		let cache = ResourceCache::new(Numbered::default());
		let handle = cache.get(&1).expect("factory should succeed");
		let before = handle.get_arc();

		assert_eq!(cache.recreate(&1), Ok(true));

		assert_eq!(*handle.get(), "1#1");
		assert_eq!(*before, "1#0");
		assert_eq!(handle.generation(), 1);
	}

	#[test]
	fn test_recreate_while_borrowed_on_same_thread() {
		let cache = ResourceCache::new(Numbered::default());
		let handle = cache.get(&1).expect("factory should succeed");
		let borrowed = handle.get();

		assert_eq!(cache.recreate(&1), Ok(true));
		assert!(cache.recreate_all().is_ok());

		assert_eq!(*borrowed, "1#0");
		assert_eq!(*handle.get(), "1#2");
		assert_eq!(handle.generation(), 2);
	}

	#[test]
	fn test_recreate_failure_keeps_resource() {
		let cache = ResourceCache::new(Numbered::default());
		let handle = cache.get(&1).expect("factory should succeed");

		cache.factory().fail.store(true, Ordering::Relaxed);
		assert_eq!(cache.recreate(&1), Err(BuildError(1)));

		assert_eq!(*handle.get(), "1#0");
		assert_eq!(handle.generation(), 0);
		assert_eq!(cache.metrics().recreate_failures, 1);
	}

	#[test]
	fn test_purge_unused_keeps_referenced_entries() {
		let cache = ResourceCache::new(Numbered::default());
		let kept = cache.get(&1).expect("factory should succeed");
		drop(cache.get(&2).expect("factory should succeed"));

		assert_eq!(cache.purge_unused(), 1);
		assert!(cache.contains(&1));
		assert!(!cache.contains(&2));
		drop(kept);
	}

	#[test]
	fn test_drop_without_handles_is_quiet() {
		let cache = ResourceCache::new(Numbered::default());
		drop(cache.get(&1).expect("factory should succeed"));
		drop(cache);
	}

	#[test]
	#[should_panic(expected = "dropped with 1 live handle(s) outstanding")]
	fn test_drop_with_live_handle_panics() {
		let cache = ResourceCache::new(Numbered::default());
		let handle = cache.get(&1).expect("factory should succeed");
		drop(cache);
		drop(handle);
	}

	#[test]
	fn test_cache_is_send_sync() {
		fn assert_send<T: Send>() {}
		fn assert_sync<T: Sync>() {}

		assert_send::<ResourceCache<Numbered>>();
		assert_sync::<ResourceCache<Numbered>>();
	}
}
