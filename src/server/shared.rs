//! The filter slot shared by every connection.

use crate::blacklist::Blacklist;
use crate::config::{FilterConfig, Options};
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Holds the one filter of a server, created by the first valid
/// configuration.
pub struct SharedFilter {
    path: PathBuf,
    options: Options,
    filter: RwLock<Option<Arc<Blacklist>>>,
}

impl SharedFilter {
    /// An unconfigured slot whose filter will be journaled at `path`.
    pub fn new<P: AsRef<Path>>(path: P, options: Options) -> Self {
        Self { path: path.as_ref().to_path_buf(), options, filter: RwLock::new(None) }
    }

    /// A slot configured up front.
    pub fn with_config<P: AsRef<Path>>(path: P, config: FilterConfig, options: Options) -> Self {
        let shared = Self::new(path, options);
        shared.configure(config);
        shared
    }

    /// The filter, once configured.
    pub fn get(&self) -> Option<Arc<Blacklist>> {
        self.filter.read().clone()
    }

    /// Configures the filter unless that has already happened.
    ///
    /// Returns true if this call performed the configuration. Later calls
    /// leave the existing filter untouched and return false.
    pub fn configure(&self, config: FilterConfig) -> bool {
        let mut slot = self.filter.write();
        if slot.is_some() {
            return false;
        }

        log::info!("Configuring filter: {}", config);
        *slot = Some(Arc::new(Blacklist::open(&self.path, config, self.options.clone())));
        true
    }

    /// Returns true once configured.
    pub fn is_ready(&self) -> bool {
        self.filter.read().is_some()
    }
}
