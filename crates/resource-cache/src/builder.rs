use std::borrow::Cow;

use crate::cache::ResourceCache;
use crate::traits::ResourceFactory;

/// Builder for configuring a [`ResourceCache`].
///
/// # Example
///
/// ```
/// use resource_cache::{CacheBuilder, ResourceFactory};
///
/// struct Len;
///
/// impl ResourceFactory for Len {
///     type Key = String;
///     type Resource = usize;
///     type Error = std::convert::Infallible;
///
///     fn create(&self, key: &String) -> Result<usize, Self::Error> {
///         Ok(key.len())
///     }
/// }
///
/// let cache = CacheBuilder::new(Len)
///     .name("lengths")
///     .capacity(32)
///     .build();
/// assert_eq!(cache.name(), "lengths");
/// ```
pub struct CacheBuilder<F> {
	factory: F,
	name: Cow<'static, str>,
	capacity: usize,
}

impl<F: ResourceFactory> CacheBuilder<F> {
	/// Create a builder around the factory that will build every resource.
	pub fn new(factory: F) -> Self {
		Self {
			factory,
			name: Cow::Borrowed(ResourceCache::<F>::DEFAULT_NAME),
			capacity: 0,
		}
	}

	/// Name shown in log events and in the teardown panic message.
	///
	/// Default: `"resources"`
	pub fn name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
		self.name = name.into();
		self
	}

	/// Number of entries to allocate up front.
	///
	/// Default: 0 (grow on demand)
	pub fn capacity(mut self, capacity: usize) -> Self {
		self.capacity = capacity;
		self
	}

	/// Build the cache with the configured settings.
	pub fn build(self) -> ResourceCache<F> {
		ResourceCache::from_parts(self.factory, self.name, self.capacity)
	}
}
