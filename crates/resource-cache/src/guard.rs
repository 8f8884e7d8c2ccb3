use std::ops::Deref;
use std::sync::Arc;

use arc_swap::Guard;

/// Borrow of a handle's current resource.
///
/// Loading never blocks and never blocks a reload: a `recreate` of the same
/// key may run while the guard is alive, even on the same thread. The guard
/// keeps showing the resource that was current when it was taken, and that
/// resource stays allocated until the guard drops.
///
/// Guards are meant to be short-lived. Use
/// [`Handle::get_arc`](crate::Handle::get_arc) to keep a resource for longer.
pub struct ResourceRef<R> {
	guard: Guard<Arc<R>>,
}

impl<R> ResourceRef<R> {
	pub(crate) fn new(guard: Guard<Arc<R>>) -> Self {
		Self {
			guard,
		}
	}

	/// Clone the `Arc` of the borrowed resource.
	pub fn to_arc(&self) -> Arc<R> {
		Arc::clone(&self.guard)
	}
}

impl<R> Deref for ResourceRef<R> {
	type Target = R;

	fn deref(&self) -> &R {
		&self.guard
	}
}

impl<R: std::fmt::Debug> std::fmt::Debug for ResourceRef<R> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		(**self).fmt(f)
	}
}

impl<R: std::fmt::Display> std::fmt::Display for ResourceRef<R> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		(**self).fmt(f)
	}
}

impl<R: PartialEq> PartialEq for ResourceRef<R> {
	fn eq(&self, other: &Self) -> bool {
		**self == **other
	}
}

impl<R: PartialEq> PartialEq<R> for ResourceRef<R> {
	fn eq(&self, other: &R) -> bool {
		**self == *other
	}
}
