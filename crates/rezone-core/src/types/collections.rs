//! Fast hash collections used throughout the workspace.
//!
//! Zone identifiers are small trusted keys, so the non-cryptographic
//! Fx hasher is used everywhere instead of SipHash.

pub use rustc_hash::{FxHashMap, FxHashSet};

/// Create an empty `FxHashMap` with room for `capacity` entries.
pub fn fx_map_with_capacity<K, V>(capacity: usize) -> FxHashMap<K, V> {
    FxHashMap::with_capacity_and_hasher(capacity, Default::default())
}

/// Create an empty `FxHashSet` with room for `capacity` entries.
pub fn fx_set_with_capacity<T>(capacity: usize) -> FxHashSet<T> {
    FxHashSet::with_capacity_and_hasher(capacity, Default::default())
}
