//! The line protocol.
//!
//! Clients send one newline-terminated command per line and receive exactly
//! one response per command before the next line is read:
//!
//! | request | response |
//! |---|---|
//! | `POST <url>` | `201 Created` |
//! | `GET <url>` | `200 Ok`, a blank line, then `false`, `true true` or `true false` |
//! | `DELETE <url>` | `204 No Content`, or `404 Not Found` if the url was not present |
//! | anything else | `400 Bad Request` |
//!
//! Until some connection sends a valid `<size> <depth>...` line the server is
//! awaiting configuration and answers nothing.

pub mod request;
pub mod response;
pub mod session;

pub use request::Request;
pub use response::Response;
pub use session::{Session, SessionState};
