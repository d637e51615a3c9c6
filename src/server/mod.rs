//! TCP front end.
//!
//! ## Architecture
//!
//! - **Accept loop**: one thread accepts connections and queues them
//! - **Workers**: `max_clients` threads each serve one connection at a time;
//!   queued connections wait for a free worker
//! - **Shared filter**: every connection talks to the same [`SharedFilter`],
//!   configured once for the whole server
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bloomlist::server::{Server, ServerConfig};
//!
//! # fn main() -> Result<(), bloomlist::Error> {
//! let server = Server::bind(ServerConfig::default())?;
//! println!("listening on {}", server.local_addr()?);
//! server.run()
//! # }
//! ```

pub mod config;
pub mod handler;
pub mod shared;

pub use config::ServerConfig;
pub use handler::ConnectionHandler;
pub use shared::SharedFilter;

use crate::error::{Error, Result};
use crossbeam::channel;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Pause after a failed accept, so descriptor exhaustion does not spin.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// A bound, not yet running, blacklist server.
pub struct Server {
    listener: TcpListener,
    config: ServerConfig,
    shared: Arc<SharedFilter>,
    shutdown: Arc<AtomicBool>,
}

impl Server {
    /// Binds the listening socket and prepares the shared filter.
    ///
    /// If `config.initial_config` is set the filter is opened right away and
    /// the server starts READY.
    pub fn bind(config: ServerConfig) -> Result<Self> {
        config.validate()?;

        let shared = match &config.initial_config {
            Some(filter_config) => {
                SharedFilter::with_config(&config.data_path, filter_config.clone(), config.options.clone())
            }
            None => SharedFilter::new(&config.data_path, config.options.clone()),
        };

        let listener = TcpListener::bind(config.bind_addr)?;
        log::info!("Listening on {} with {} workers", listener.local_addr()?, config.max_clients);

        Ok(Self { listener, config, shared: Arc::new(shared), shutdown: Arc::new(AtomicBool::new(false)) })
    }

    /// Address the server is listening on.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// The filter shared by all connections.
    pub fn shared(&self) -> &Arc<SharedFilter> {
        &self.shared
    }

    /// Accepts connections until shut down, then waits for the connections
    /// already being served to finish.
    pub fn run(self) -> Result<()> {
        let (tx, rx) = channel::bounded::<TcpStream>(self.config.max_clients);

        let workers: Vec<JoinHandle<()>> = (0..self.config.max_clients)
            .map(|id| {
                let rx = rx.clone();
                let shared = Arc::clone(&self.shared);
                let max_line_bytes = self.config.max_line_bytes;
                thread::Builder::new()
                    .name(format!("bloomlist-worker-{}", id))
                    .spawn(move || {
                        for stream in rx.iter() {
                            Self::serve(stream, Arc::clone(&shared), max_line_bytes);
                        }
                    })
                    .map_err(Error::from)
            })
            .collect::<Result<_>>()?;
        drop(rx);

        for conn in self.listener.incoming() {
            if self.shutdown.load(Ordering::SeqCst) {
                break;
            }

            match conn {
                Ok(stream) => {
                    if tx.send(stream).is_err() {
                        return Err(Error::internal("all workers exited"));
                    }
                }
                Err(e) => {
                    log::error!("Failed to accept connection: {}", e);
                    thread::sleep(ACCEPT_BACKOFF);
                }
            }
        }

        drop(tx);
        for worker in workers {
            if worker.join().is_err() {
                log::error!("Worker thread panicked");
            }
        }
        log::info!("Server stopped");
        Ok(())
    }

    /// Serves one connection. A panic while serving ends that connection
    /// only; the worker stays in the pool.
    fn serve(stream: TcpStream, shared: Arc<SharedFilter>, max_line_bytes: usize) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            ConnectionHandler::new(stream, shared, max_line_bytes).and_then(|h| h.handle())
        }));

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(e)) => log::warn!("Connection ended with error: {}", e),
            Err(_) => log::error!("Connection handler panicked, connection dropped"),
        }
    }

    /// Runs the server on a background thread.
    pub fn spawn(self) -> Result<ServerHandle> {
        let addr = self.local_addr()?;
        let shutdown = Arc::clone(&self.shutdown);
        let shared = Arc::clone(&self.shared);
        let thread = thread::Builder::new().name("bloomlist-accept".into()).spawn(move || self.run())?;

        Ok(ServerHandle { addr, shutdown, shared, thread: Some(thread) })
    }
}

/// Handle to a server running on a background thread.
pub struct ServerHandle {
    addr: SocketAddr,
    shutdown: Arc<AtomicBool>,
    shared: Arc<SharedFilter>,
    thread: Option<JoinHandle<Result<()>>>,
}

impl ServerHandle {
    /// Address the server is listening on.
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// The filter shared by all connections.
    pub fn shared(&self) -> &Arc<SharedFilter> {
        &self.shared
    }

    /// Stops accepting and waits for open connections to close.
    pub fn shutdown(mut self) -> Result<()> {
        self.stop()
    }

    fn stop(&mut self) -> Result<()> {
        let Some(thread) = self.thread.take() else {
            return Ok(());
        };

        self.shutdown.store(true, Ordering::SeqCst);
        // Wake the accept loop so it sees the flag
        let _ = TcpStream::connect(self.addr);

        thread.join().map_err(|_| Error::internal("accept thread panicked"))?
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            log::warn!("Error stopping server: {}", e);
        }
    }
}
