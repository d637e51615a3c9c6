//! Per-connection protocol state machine.

use super::{Request, Response};
use crate::blacklist::Blacklist;
use crate::server::SharedFilter;
use std::sync::Arc;

/// Where a session stands relative to the shared filter.
#[derive(Clone)]
pub enum SessionState {
    /// No filter has been configured yet, anywhere.
    AwaitingConfig,
    /// Commands are served against the shared filter.
    Ready(Arc<Blacklist>),
    /// The connection has ended.
    Closed,
}

/// Protocol state for one connection.
///
/// Sessions on different connections share one [`SharedFilter`]; the first
/// valid configuration line seen by any of them moves all of them to READY.
pub struct Session {
    shared: Arc<SharedFilter>,
    state: SessionState,
}

impl Session {
    /// Start a session against `shared`.
    pub fn new(shared: Arc<SharedFilter>) -> Self {
        let state = match shared.get() {
            Some(filter) => SessionState::Ready(filter),
            None => SessionState::AwaitingConfig,
        };
        Self { shared, state }
    }

    /// Current state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Returns true once the session serves commands.
    pub fn is_ready(&self) -> bool {
        matches!(self.state, SessionState::Ready(_))
    }

    /// Handles one line, returning the response to write back, if any.
    ///
    /// Before READY, lines are configuration attempts and are never
    /// answered.
    pub fn handle_line(&mut self, line: &str) -> Option<Response> {
        self.refresh();

        match &self.state {
            SessionState::AwaitingConfig => self.configure(line),
            SessionState::Ready(filter) => Some(Self::dispatch(filter, Request::parse(line))),
            SessionState::Closed => None,
        }
    }

    /// Picks up a configuration made by another connection.
    fn refresh(&mut self) {
        if let SessionState::AwaitingConfig = self.state {
            if let Some(filter) = self.shared.get() {
                self.state = SessionState::Ready(filter);
            }
        }
    }

    fn configure(&mut self, line: &str) -> Option<Response> {
        let Request::Configure(config) = Request::parse(line) else {
            log::debug!("Ignoring {:?} while awaiting configuration", line);
            return None;
        };

        let won = self.shared.configure(config);
        let filter = self.shared.get()?;
        self.state = SessionState::Ready(filter);

        if won {
            None
        } else {
            // Another connection configured the filter first
            Some(Response::BadRequest)
        }
    }

    fn dispatch(filter: &Blacklist, request: Request) -> Response {
        match request {
            Request::Post(url) => {
                filter.add(&url);
                Response::Created
            }
            Request::Get(url) => Response::Ok(filter.lookup(&url)),
            Request::Delete(url) => {
                if filter.remove(&url) {
                    Response::NoContent
                } else {
                    Response::NotFound
                }
            }
            Request::Configure(config) => {
                log::debug!("Rejecting reconfiguration to {} after READY", config);
                Response::BadRequest
            }
            Request::Invalid(reason) => {
                log::debug!("Bad request: {}", reason);
                Response::BadRequest
            }
        }
    }

    /// Handles a line that could not be decoded as text. It is a bad request
    /// once READY and ignored before.
    pub fn handle_invalid(&mut self) -> Option<Response> {
        self.refresh();
        match self.state {
            SessionState::Ready(_) => Some(Response::BadRequest),
            SessionState::AwaitingConfig | SessionState::Closed => None,
        }
    }

    /// Ends the session; later lines are ignored.
    pub fn close(&mut self) {
        self.state = SessionState::Closed;
    }
}
