//! # Resource Cache
//!
//! A keyed cache for expensive, externally built objects (compiled shaders,
//! pipeline state objects, textures) with:
//! - **Single instance per key**: equal keys always share one resource
//! - **Tracked handles**: move-only references registered with their entry
//! - **Hot reload**: rebuild a key and every live handle sees the new resource
//! - **Failure continuity**: a failed rebuild keeps the working resource
//!
//! ## Quick Start
//!
//! ```rust
//! use resource_cache::{ResourceCache, ResourceFactory};
//! use std::sync::atomic::{AtomicU32, Ordering};
//!
//! // Builds "<key> v<n>", where n counts builds
//! #[derive(Default)]
//! struct Versioned(AtomicU32);
//!
//! impl ResourceFactory for Versioned {
//!     type Key = String;
//!     type Resource = String;
//!     type Error = std::convert::Infallible;
//!
//!     fn create(&self, key: &String) -> Result<String, Self::Error> {
//!         let version = self.0.fetch_add(1, Ordering::Relaxed);
//!         Ok(format!("{key} v{version}"))
//!     }
//! }
//!
//! let cache = ResourceCache::new(Versioned::default());
//! let key = "scene.hlsl".to_string();
//!
//! let handle = cache.get(&key).unwrap();
//! assert_eq!(*handle.get(), "scene.hlsl v0");
//!
//! // Hot reload: the existing handle follows the rebuilt resource
//! cache.recreate(&key).unwrap();
//! assert_eq!(*handle.get(), "scene.hlsl v1");
//!
//! // Handles must be gone before the cache is dropped
//! drop(handle);
//! ```
//!
//! ## Composing Caches
//!
//! A factory may hold handles from other caches inside the resources it
//! builds. A pipeline cache, for instance, keeps handles to its vertex and
//! pixel shaders, so reloading a shader is picked up by every pipeline that
//! uses it. Drop the composed cache before the caches it draws from.

mod builder;
mod cache;
mod entry;
mod guard;
mod handle;
pub mod hash;
mod metrics;
mod report;
mod traits;

pub use builder::CacheBuilder;
pub use cache::ResourceCache;
pub use guard::ResourceRef;
pub use handle::Handle;
pub use metrics::CacheMetrics;
pub use report::ReloadReport;
pub use traits::{ResourceFactory, ResourceKey};
