//! Server configuration.

use crate::config::{FilterConfig, Options};
use crate::error::{Error, Result};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Settings for a [`Server`](super::Server).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on.
    /// Default: 127.0.0.1:5555
    pub bind_addr: SocketAddr,

    /// Connections serviced at the same time; further connections wait.
    /// Default: 16
    pub max_clients: usize,

    /// Longest accepted request line, terminator excluded.
    /// Default: 64KB
    pub max_line_bytes: usize,

    /// Journal backing the shared filter.
    /// Default: filter_data.bin
    pub data_path: PathBuf,

    /// Filter configuration applied at startup. When `None` the server waits
    /// for a configuration line from a client.
    pub initial_config: Option<FilterConfig>,

    /// Persistence options for the shared filter.
    pub options: Options,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5555)),
            max_clients: 16,
            max_line_bytes: 64 * 1024,
            data_path: PathBuf::from("filter_data.bin"),
            initial_config: None,
            options: Options::default(),
        }
    }
}

impl ServerConfig {
    /// Validates the configuration and returns an error if any value is invalid.
    pub fn validate(&self) -> Result<()> {
        if self.max_clients == 0 {
            return Err(Error::invalid_argument("max_clients must be > 0"));
        }
        if self.max_line_bytes == 0 {
            return Err(Error::invalid_argument("max_line_bytes must be > 0"));
        }
        Ok(())
    }
}
