use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Bound for cache keys.
///
/// A key describes the construction parameters of a resource (a file path, a
/// descriptor struct, ...). Keys are immutable once stored: the cache keeps its
/// own clone and never hands out mutable access to it.
///
/// Blanket-implemented for every type meeting the bounds.
pub trait ResourceKey: Hash + Eq + Clone + Debug + Send + Sync + 'static {}

impl<T> ResourceKey for T where T: Hash + Eq + Clone + Debug + Send + Sync + 'static {}

/// Builds resources for a [`ResourceCache`](crate::ResourceCache).
///
/// One factory exists per resource type. The cache calls [`create`](Self::create)
/// on the first `get` of a key and again for every `recreate` of that key.
///
/// # Re-entrancy
///
/// `create` runs while the cache's table lock is held. A factory may request
/// handles from *other* caches (a pipeline factory asking a shader cache), but
/// must never call back into the cache it is building for.
///
/// # Example
///
/// ```
/// use resource_cache::ResourceFactory;
///
/// struct Upper;
///
/// impl ResourceFactory for Upper {
///     type Key = String;
///     type Resource = String;
///     type Error = std::convert::Infallible;
///
///     fn create(&self, key: &String) -> Result<String, Self::Error> {
///         Ok(key.to_uppercase())
///     }
/// }
/// ```
pub trait ResourceFactory: Send + Sync + 'static {
	/// Construction parameters identifying one resource.
	type Key: ResourceKey;

	/// The expensive object owned by the cache.
	type Resource: Send + Sync + 'static;

	/// Reported when a resource cannot be built for a key.
	type Error: Display;

	/// Build the resource for `key`.
	fn create(&self, key: &Self::Key) -> Result<Self::Resource, Self::Error>;
}
