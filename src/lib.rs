//! # bloomlist - A Persistent Bloom Filter URL Blacklist
//!
//! bloomlist keeps a blacklist of URLs in a Bloom filter backed by an exact
//! verification set, journals every change to disk, and serves the blacklist
//! to many concurrent clients over a line-based TCP protocol.
//!
//! ## Architecture
//!
//! The service consists of several key components:
//!
//! - **Hash Family**: one seeded hash function per configured depth
//! - **Bloom Engine**: a fixed-size bit array that is only ever set
//! - **Shadow Set**: exact membership, the only structure removal touches
//! - **Journal**: append-only record of adds and removes, replayed on open
//! - **Blacklist**: the facade combining the above behind one lock
//! - **Server**: worker-per-connection TCP front end speaking the protocol
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use bloomlist::{Blacklist, FilterConfig, Options};
//!
//! # fn main() -> Result<(), bloomlist::Error> {
//! // A 256-bit filter with three hash functions
//! let config = FilterConfig::new(256, vec![1, 2, 3])?;
//! let blacklist = Blacklist::open("./filter_data.bin", config, Options::default());
//!
//! blacklist.add("www.example.com");
//!
//! // The Bloom engine may report false positives; double_check is exact
//! if blacklist.check("www.example.com") {
//!     println!("exact: {}", blacklist.double_check("www.example.com"));
//! }
//!
//! // Removal only affects the exact set
//! blacklist.remove("www.example.com");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// Module declarations
pub mod blacklist;
pub mod config;
pub mod error;
pub mod filter;
pub mod journal;
pub mod protocol;
pub mod server;
pub mod validator;

// Re-exports
pub use blacklist::{Blacklist, Verdict};
pub use config::{FilterConfig, Options};
pub use error::{Error, Result};
pub use server::{Server, ServerConfig, ServerHandle};
