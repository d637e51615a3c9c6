//! Status-coded responses.

use crate::blacklist::Verdict;
use std::fmt;

/// A response line (and body, for `GET`) written back to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    /// `201 Created`
    Created,
    /// `200 Ok` with the lookup result as body
    Ok(Verdict),
    /// `204 No Content`
    NoContent,
    /// `404 Not Found`
    NotFound,
    /// `400 Bad Request`
    BadRequest,
}

impl Response {
    /// Numeric status code.
    pub fn status(&self) -> u16 {
        match self {
            Response::Created => 201,
            Response::Ok(_) => 200,
            Response::NoContent => 204,
            Response::NotFound => 404,
            Response::BadRequest => 400,
        }
    }
}

impl fmt::Display for Response {
    /// Renders the exact bytes sent on the wire, trailing newline included.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Created => f.write_str("201 Created\n"),
            Response::Ok(Verdict::Absent) => f.write_str("200 Ok\n\nfalse\n"),
            Response::Ok(Verdict::Present) => f.write_str("200 Ok\n\ntrue true\n"),
            Response::Ok(Verdict::FalsePositive) => f.write_str("200 Ok\n\ntrue false\n"),
            Response::NoContent => f.write_str("204 No Content\n"),
            Response::NotFound => f.write_str("404 Not Found\n"),
            Response::BadRequest => f.write_str("400 Bad Request\n"),
        }
    }
}
