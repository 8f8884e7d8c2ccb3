use std::fmt;

/// Outcome of a bulk [`recreate_all`](crate::ResourceCache::recreate_all).
///
/// A failure for one key never stops the pass; each failing key is listed
/// with its factory error and keeps serving its previous resource.
pub struct ReloadReport<K, E> {
	recreated: Vec<K>,
	failures: Vec<(K, E)>,
}

impl<K, E> ReloadReport<K, E> {
	pub(crate) fn new() -> Self {
		Self {
			recreated: Vec::new(),
			failures: Vec::new(),
		}
	}

	pub(crate) fn push_recreated(&mut self, key: K) {
		self.recreated.push(key);
	}

	pub(crate) fn push_failure(&mut self, key: K, error: E) {
		self.failures.push((key, error));
	}

	/// True when every key was rebuilt.
	pub fn is_ok(&self) -> bool {
		self.failures.is_empty()
	}

	/// Keys whose resource was replaced.
	pub fn recreated(&self) -> &[K] {
		&self.recreated
	}

	/// Keys that kept their old resource, with the reason.
	pub fn failures(&self) -> &[(K, E)] {
		&self.failures
	}

	/// Consume the report, returning the failures.
	pub fn into_failures(self) -> Vec<(K, E)> {
		self.failures
	}
}

impl<K: fmt::Debug, E: fmt::Display> fmt::Debug for ReloadReport<K, E> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let failures: Vec<_> =
			self.failures.iter().map(|(key, error)| (key, error.to_string())).collect();
		f.debug_struct("ReloadReport")
			.field("recreated", &self.recreated)
			.field("failures", &failures)
			.finish()
	}
}
