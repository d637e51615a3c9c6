//! Configuration for a filter instance.
//!
//! [`FilterConfig`] fixes the bit array size and the hash family of a filter
//! and is immutable once a filter has been built from it. [`Options`] tunes
//! how the filter persists itself.

use crate::error::{Error, Result};
use std::fmt;

/// Largest accepted bit array size, 2^32 bits (512 MiB).
pub const MAX_FILTER_SIZE: u64 = 1 << 32;

/// Bit array size and hash depths for one filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterConfig {
    size: usize,
    depths: Vec<i64>,
}

impl FilterConfig {
    /// Creates a configuration, rejecting a size of zero or above
    /// [`MAX_FILTER_SIZE`], and an empty depth list. Any integer is a valid
    /// depth.
    pub fn new(size: usize, depths: Vec<i64>) -> Result<Self> {
        if size == 0 {
            return Err(Error::invalid_argument("size must be > 0"));
        }
        if size as u64 > MAX_FILTER_SIZE {
            return Err(Error::invalid_argument(format!("size must be <= {}", MAX_FILTER_SIZE)));
        }
        if depths.is_empty() {
            return Err(Error::invalid_argument("at least one hash depth is required"));
        }
        Ok(Self { size, depths })
    }

    /// Parses a `"<size> <depth_1> ... <depth_k>"` line.
    ///
    /// Every token must be an integer. Returns `None` for anything else,
    /// for a size out of range and for a line with no depths.
    pub fn parse(line: &str) -> Option<Self> {
        let mut tokens = line.split_whitespace();
        let size = tokens.next()?.parse::<usize>().ok()?;
        let depths = tokens.map(|t| t.parse::<i64>().ok()).collect::<Option<Vec<_>>>()?;
        Self::new(size, depths).ok()
    }

    /// Number of bits in the filter.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Hash depths, one per hash function.
    pub fn depths(&self) -> &[i64] {
        &self.depths
    }
}

impl fmt::Display for FilterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.size)?;
        for depth in &self.depths {
            write!(f, " {}", depth)?;
        }
        Ok(())
    }
}

/// Persistence options for opening a filter.
#[derive(Debug, Clone)]
pub struct Options {
    /// Fsync the journal after every append.
    /// Default: true
    pub sync_journal: bool,

    /// Rewrite the journal into its compact form when opening, if that
    /// shrinks it.
    /// Default: true
    pub compact_on_open: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self { sync_journal: true, compact_on_open: true }
    }
}

impl Options {
    /// Creates a new Options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether every journal append is fsync'd.
    pub fn sync_journal(mut self, value: bool) -> Self {
        self.sync_journal = value;
        self
    }

    /// Sets whether the journal is compacted on open.
    pub fn compact_on_open(mut self, value: bool) -> Self {
        self.compact_on_open = value;
        self
    }
}
