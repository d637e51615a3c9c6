//! Reading side of the journal, used on open.

use super::record::{Frame, FrameKind, HEADER_SIZE};
use crate::error::{Error, Result};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Reads framed entries back from a journal file.
pub struct JournalReader {
    reader: BufReader<File>,
    position: u64,
}

impl JournalReader {
    /// Open a journal file for reading
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self { reader: BufReader::new(file), position: 0 })
    }

    /// Read the next complete entry, reassembling fragments.
    ///
    /// Returns `Ok(None)` at a clean end of file. A frame cut short by the end
    /// of the file is reported as corruption.
    pub fn read_next(&mut self) -> Result<Option<Vec<u8>>> {
        let mut assembled: Option<Vec<u8>> = None;

        loop {
            let frame = match self.read_frame()? {
                Some(frame) => frame,
                None if assembled.is_some() => {
                    return Err(Error::corruption("EOF inside a fragmented entry"));
                }
                None => return Ok(None),
            };

            match (frame.kind, assembled.as_mut()) {
                (FrameKind::Full, None) => return Ok(Some(frame.payload)),
                (FrameKind::First, None) => assembled = Some(frame.payload),
                (FrameKind::Middle, Some(buf)) => buf.extend_from_slice(&frame.payload),
                (FrameKind::Last, Some(buf)) => {
                    buf.extend_from_slice(&frame.payload);
                    return Ok(assembled);
                }
                (kind, _) => {
                    return Err(Error::corruption(format!("Unexpected {:?} frame", kind)));
                }
            }
        }
    }

    fn read_frame(&mut self) -> Result<Option<Frame>> {
        let mut header = [0u8; HEADER_SIZE];
        match self.reader.read_exact(&mut header) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(Error::Io(e)),
        }

        let length = Frame::declared_len(&header);
        let mut buffer = vec![0u8; HEADER_SIZE + length];
        buffer[..HEADER_SIZE].copy_from_slice(&header);

        match self.reader.read_exact(&mut buffer[HEADER_SIZE..]) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                return Err(Error::corruption(format!(
                    "Frame at offset {} truncated",
                    self.position
                )));
            }
            Err(e) => return Err(Error::Io(e)),
        }

        let frame = Frame::decode(&buffer)?;
        self.position += buffer.len() as u64;
        Ok(Some(frame))
    }

    /// Offset just past the last frame read successfully.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Length of the underlying file.
    pub fn file_len(&self) -> Result<u64> {
        Ok(self.reader.get_ref().metadata()?.len())
    }
}
