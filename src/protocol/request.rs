//! Request parsing.

use crate::config::FilterConfig;
use crate::validator::{is_valid_url, split_command};

/// One classified request line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// `POST <url>`
    Post(String),
    /// `GET <url>`
    Get(String),
    /// `DELETE <url>`
    Delete(String),
    /// A well-formed `<size> <depth>...` line.
    Configure(FilterConfig),
    /// Anything else, with the reason it was rejected.
    Invalid(&'static str),
}

impl Request {
    /// Classifies a line with its terminator already stripped.
    ///
    /// Verbs are case-sensitive and take exactly one argument, which must be
    /// a valid url.
    pub fn parse(line: &str) -> Self {
        if let Some(config) = FilterConfig::parse(line) {
            return Request::Configure(config);
        }

        let Some((verb, url)) = split_command(line) else {
            return Request::Invalid("expected a verb and one argument");
        };

        let build: fn(String) -> Request = match verb {
            "POST" => Request::Post,
            "GET" => Request::Get,
            "DELETE" => Request::Delete,
            _ => return Request::Invalid("unknown verb"),
        };

        if !is_valid_url(url) {
            return Request::Invalid("invalid url");
        }
        build(url.to_owned())
    }
}
