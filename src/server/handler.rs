//! Connection handling.

use super::SharedFilter;
use crate::error::Result;
use crate::protocol::Session;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::Arc;

/// What one read from the client produced.
#[derive(Debug, PartialEq, Eq)]
enum Line {
    /// A complete line, terminator stripped.
    Text(String),
    /// A line that is not UTF-8.
    Binary,
    /// A line longer than the limit.
    TooLong,
    /// The client closed its side.
    Eof,
}

/// Serves one client connection until it disconnects.
pub struct ConnectionHandler {
    stream: TcpStream,
    peer: SocketAddr,
    session: Session,
    max_line_bytes: usize,
}

impl ConnectionHandler {
    /// Create a handler for an accepted stream.
    pub fn new(stream: TcpStream, shared: Arc<SharedFilter>, max_line_bytes: usize) -> Result<Self> {
        let peer = stream.peer_addr()?;
        Ok(Self { stream, peer, session: Session::new(shared), max_line_bytes })
    }

    /// Address of the client.
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Reads lines and writes responses until the client disconnects or
    /// breaks framing.
    pub fn handle(mut self) -> Result<()> {
        log::info!("Client {} connected", self.peer);
        let mut reader = BufReader::new(self.stream.try_clone()?);

        let result = loop {
            let line = match read_line(&mut reader, self.max_line_bytes) {
                Ok(line) => line,
                Err(e) => break Err(e.into()),
            };

            let response = match line {
                Line::Text(text) => self.session.handle_line(&text),
                Line::Binary => self.session.handle_invalid(),
                Line::TooLong => {
                    log::warn!("Client {} sent a line over {} bytes, closing", self.peer, self.max_line_bytes);
                    break Ok(());
                }
                Line::Eof => break Ok(()),
            };

            if let Some(response) = response {
                log::debug!("{} <- {}", self.peer, response.status());
                if let Err(e) = self.stream.write_all(response.to_string().as_bytes()) {
                    break Err(e.into());
                }
            }
        };

        self.session.close();
        log::info!("Client {} disconnected", self.peer);
        result
    }
}

/// Reads one `\n`-terminated line of at most `max` bytes, dropping a trailing
/// `\r`. A final line without terminator is returned as is.
fn read_line<R: BufRead>(reader: &mut R, max: usize) -> std::io::Result<Line> {
    let mut buf = Vec::new();
    let limit = max as u64 + 1;
    let n = reader.by_ref().take(limit).read_until(b'\n', &mut buf)?;
    if n == 0 {
        return Ok(Line::Eof);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    } else if buf.len() > max {
        return Ok(Line::TooLong);
    }

    Ok(String::from_utf8(buf).map(Line::Text).unwrap_or(Line::Binary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn lines(input: &[u8], max: usize) -> Vec<Line> {
        let mut reader = Cursor::new(input.to_vec());
        let mut out = Vec::new();
        loop {
            let line = read_line(&mut reader, max).unwrap();
            let done = matches!(line, Line::Eof | Line::TooLong);
            out.push(line);
            if done {
                return out;
            }
        }
    }

    #[test]
    fn test_read_lines() {
        assert_eq!(
            lines(b"POST a.com\nGET a.com\r\n\nlast", 64),
            vec![
                Line::Text("POST a.com".into()),
                Line::Text("GET a.com".into()),
                Line::Text(String::new()),
                Line::Text("last".into()),
                Line::Eof,
            ]
        );
    }

    #[test]
    fn test_line_limit() {
        assert_eq!(lines(b"12345\n", 5), vec![Line::Text("12345".into()), Line::Eof]);
        assert_eq!(lines(b"123456\n", 5), vec![Line::TooLong]);
    }

    #[test]
    fn test_binary_line() {
        assert_eq!(lines(b"\xff\xfe\nok\n", 64), vec![Line::Binary, Line::Text("ok".into()), Line::Eof]);
    }
}
