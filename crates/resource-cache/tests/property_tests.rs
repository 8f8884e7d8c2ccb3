use std::sync::Arc;

use proptest::prelude::*;
use resource_cache::{ResourceCache, ResourceFactory};

struct Doubler;

impl ResourceFactory for Doubler {
	type Key = u16;
	type Resource = u32;
	type Error = std::convert::Infallible;

	fn create(&self, key: &u16) -> Result<u32, Self::Error> {
		Ok(u32::from(*key) * 2)
	}
}

proptest! {
	#[test]
	fn test_live_count_follows_drops(
		count in 1usize..40,
		order in prop::collection::vec(any::<prop::sample::Index>(), 40)
	) {
		let cache = ResourceCache::new(Doubler);
		let mut handles: Vec<_> = (0..count).map(|_| cache.get(&1).unwrap()).collect();
		prop_assert_eq!(cache.live_handles(&1), count);

		let mut dropped = 0;
		for index in order.iter().take(count) {
			let victim = index.index(handles.len());
			drop(handles.swap_remove(victim));
			dropped += 1;
			prop_assert_eq!(cache.live_handles(&1), count - dropped);
		}
		prop_assert!(handles.is_empty());
	}

	#[test]
	fn test_equal_keys_share_distinct_keys_do_not(keys in prop::collection::vec(0u16..16, 1..60)) {
		let cache = ResourceCache::new(Doubler);
		let handles: Vec<_> = keys.iter().map(|key| cache.get(key).unwrap()).collect();

		for (i, a) in handles.iter().enumerate() {
			for b in &handles[i + 1..] {
				let shared = Arc::ptr_eq(&a.get_arc(), &b.get_arc());
				prop_assert_eq!(shared, a.key() == b.key());
			}
		}

		let mut distinct = keys.clone();
		distinct.sort_unstable();
		distinct.dedup();
		prop_assert_eq!(cache.len(), distinct.len());
		drop(handles);
	}

	#[test]
	fn test_recreate_keeps_entry_count(keys in prop::collection::vec(0u16..8, 1..20), reloads in 1usize..5) {
		let cache = ResourceCache::new(Doubler);
		let handles: Vec<_> = keys.iter().map(|key| cache.get(key).unwrap()).collect();
		let entries = cache.len();

		for _ in 0..reloads {
			prop_assert!(cache.recreate_all().is_ok());
		}

		prop_assert_eq!(cache.len(), entries);
		for handle in &handles {
			prop_assert_eq!(*handle.get(), u32::from(*handle.key()) * 2);
			prop_assert_eq!(handle.generation(), reloads as u64);
		}
		drop(handles);
	}
}
