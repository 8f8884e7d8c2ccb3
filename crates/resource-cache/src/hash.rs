//! Key hashing helpers.
//!
//! Keys are hashed once with a fixed-seed [`ahash`] state when they enter the
//! cache. Each entry stores that fingerprint next to its key, so growing the
//! table never rehashes a stored key.
//!
//! Composite keys (a pipeline descriptor made of shader keys, state
//! descriptors and raw byte blobs) fold the fingerprints of their parts with
//! [`hash_combine`]. The fold is position-sensitive: swapping the vertex and
//! pixel shader paths of a pipeline gives a different result.

use std::hash::{BuildHasher, Hash, Hasher};

use ahash::RandomState;

const SEEDS: [u64; 4] = [
	0x243f_6a88_85a3_08d3,
	0x1319_8a2e_0370_7344,
	0xa409_3822_299f_31d0,
	0x082e_fa98_ec4e_6c89,
];

fn state() -> RandomState {
	RandomState::with_seeds(SEEDS[0], SEEDS[1], SEEDS[2], SEEDS[3])
}

/// Deterministic fingerprint of a hashable value.
///
/// Equal values always produce equal fingerprints within a build.
pub fn fingerprint<T: Hash + ?Sized>(value: &T) -> u64 {
	state().hash_one(value)
}

/// Fingerprint of a raw byte range (shader bytecode, packed descriptors).
pub fn hash_bytes(bytes: &[u8]) -> u64 {
	let mut hasher = state().build_hasher();
	hasher.write(bytes);
	hasher.finish()
}

/// Fold `value` into `seed`.
///
/// Not commutative: `hash_combine(hash_combine(0, a), b)` and
/// `hash_combine(hash_combine(0, b), a)` differ for `a != b`.
#[inline]
pub fn hash_combine(seed: u64, value: u64) -> u64 {
	seed ^ value
		.wrapping_add(0x9e37_79b9_7f4a_7c15)
		.wrapping_add(seed << 6)
		.wrapping_add(seed >> 2)
}
