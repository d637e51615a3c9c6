//! In-memory filter structures.
//!
//! The approximate half ([`BloomFilter`] over a [`HashFamily`]) and the exact
//! half ([`ShadowSet`]) are kept side by side by the facade. They are expected
//! to disagree after a removal: the bits stay set, the shadow entry goes.

pub mod bloom;
pub mod hash;
pub mod shadow;

pub use bloom::BloomFilter;
pub use hash::HashFamily;
pub use shadow::ShadowSet;
