//! Bloom engine.
//!
//! A fixed-size bit array addressed through a [`HashFamily`]. Bits are only
//! ever set, never cleared.

use super::hash::HashFamily;
use crate::config::FilterConfig;

/// BloomFilter provides probabilistic set membership testing.
///
/// # Example
/// ```
/// use bloomlist::config::FilterConfig;
/// use bloomlist::filter::BloomFilter;
///
/// let config = FilterConfig::new(1024, vec![1, 2]).unwrap();
/// let mut filter = BloomFilter::new(&config);
/// filter.set_bits(b"www.example.com");
///
/// assert!(filter.test_bits(b"www.example.com"));
/// // other items might return true (false positive) or false
/// ```
#[derive(Debug, Clone)]
pub struct BloomFilter {
    /// Bit array for the bloom filter
    bits: Vec<u8>,
    /// Number of bits in the filter
    num_bits: usize,
    /// Hash family, one function per depth
    hashes: HashFamily,
}

impl BloomFilter {
    /// Create an empty filter sized and hashed according to `config`.
    pub fn new(config: &FilterConfig) -> Self {
        let num_bits = config.size();
        let num_bytes = num_bits.div_ceil(8);

        Self { bits: vec![0u8; num_bytes], num_bits, hashes: HashFamily::new(config.depths()) }
    }

    /// Set the bit for every hash of `item`. Idempotent.
    pub fn set_bits(&mut self, item: &[u8]) {
        let num_bits = self.num_bits;
        for pos in self.hashes.positions(item, num_bits) {
            self.bits[pos / 8] |= 1 << (pos % 8);
        }
    }

    /// Returns true only if the bit for every hash of `item` is set.
    ///
    /// A false answer is definite; a true answer may be a false positive.
    pub fn test_bits(&self, item: &[u8]) -> bool {
        self.hashes.positions(item, self.num_bits).all(|pos| self.is_bit_set(pos))
    }

    /// Check if a bit is set at the given position.
    fn is_bit_set(&self, pos: usize) -> bool {
        (self.bits[pos / 8] & (1 << (pos % 8))) != 0
    }

    /// Get the number of bits in the filter.
    pub fn num_bits(&self) -> usize {
        self.num_bits
    }

    /// Get the number of hash functions used.
    pub fn num_hashes(&self) -> usize {
        self.hashes.len()
    }

    /// Number of bits currently set.
    pub fn count_ones(&self) -> usize {
        self.bits.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// Calculate the approximate false positive rate after `num_items` inserts.
    ///
    /// This is an estimate based on the theoretical formula:
    /// p = (1 - e^(-kn/m))^k
    /// where k = num_hashes, n = num_items, m = num_bits
    pub fn estimated_false_positive_rate(&self, num_items: usize) -> f64 {
        if num_items == 0 {
            return 0.0;
        }

        let k = self.num_hashes() as f64;
        let n = num_items as f64;
        let m = self.num_bits as f64;

        let exp = (-k * n / m).exp();
        (1.0 - exp).powf(k)
    }
}
