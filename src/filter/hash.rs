//! The hash family used by the Bloom engine.
//!
//! Each configured depth selects one member of the family. A member is a
//! 64-bit FNV-1a hash whose offset basis is perturbed by the depth, with a
//! SplitMix64 finalizer applied both to the seed and to the result so that
//! neighbouring depths and near-identical inputs spread across the bit array.
//! Nothing here depends on process state, so positions are stable across
//! restarts.

use std::hash::Hasher;

/// An ordered list of hash depths, one hash function per depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashFamily {
    depths: Vec<i64>,
}

impl HashFamily {
    /// Create a family from its depths.
    pub fn new(depths: &[i64]) -> Self {
        Self { depths: depths.to_vec() }
    }

    /// Number of hash functions in the family.
    pub fn len(&self) -> usize {
        self.depths.len()
    }

    /// Returns true if the family has no hash functions.
    pub fn is_empty(&self) -> bool {
        self.depths.is_empty()
    }

    /// Position of `item` in a bit array of `size` bits under one depth.
    pub fn position(depth: i64, item: &[u8], size: usize) -> usize {
        debug_assert!(size > 0);
        let mut hasher = FnvHasher::new_with_seed(mix64(depth as u64));
        hasher.write(item);
        (mix64(hasher.finish()) % size as u64) as usize
    }

    /// Positions of `item` under every depth, in depth order.
    ///
    /// Duplicate depths yield duplicate positions.
    pub fn positions<'a>(&'a self, item: &'a [u8], size: usize) -> impl Iterator<Item = usize> + 'a {
        self.depths.iter().map(move |&depth| Self::position(depth, item, size))
    }
}

/// SplitMix64 finalizer.
fn mix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9e3779b97f4a7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}

/// FNV-1a hasher with a seeded offset basis.
struct FnvHasher {
    state: u64,
}

impl FnvHasher {
    const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;

    fn new_with_seed(seed: u64) -> Self {
        Self { state: Self::FNV_OFFSET_BASIS ^ seed }
    }
}

impl Hasher for FnvHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.state ^= byte as u64;
            self.state = self.state.wrapping_mul(Self::FNV_PRIME);
        }
    }
}
