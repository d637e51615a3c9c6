//! Appending side of the journal.

use super::record::{Frame, FrameKind, MAX_FRAME_PAYLOAD};
use crate::error::Result;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Appends framed entries to a journal file.
pub struct JournalWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    file_size: u64,
    sync: bool,
}

impl JournalWriter {
    /// Open `path` for appending, creating it if it doesn't exist.
    ///
    /// With `sync` set every [`append`](Self::append) is fsync'd.
    pub fn open<P: AsRef<Path>>(path: P, sync: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let file_size = file.metadata()?.len();

        Ok(Self { path, writer: BufWriter::new(file), file_size, sync })
    }

    /// Create `path` fresh, discarding any previous content.
    pub fn create<P: AsRef<Path>>(path: P, sync: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).write(true).truncate(true).open(&path)?;

        Ok(Self { path, writer: BufWriter::new(file), file_size: 0, sync })
    }

    /// Append one entry, splitting it across frames when it is larger than a
    /// single frame payload, then flush.
    pub fn append(&mut self, data: &[u8]) -> Result<()> {
        self.write_frames(data)?;
        self.writer.flush()?;
        if self.sync {
            self.writer.get_ref().sync_data()?;
        }
        Ok(())
    }

    fn write_frames(&mut self, data: &[u8]) -> Result<()> {
        let total = data.len();
        if total == 0 {
            return self.write_frame(Frame::new(FrameKind::Full, Vec::new()));
        }

        for (i, chunk) in data.chunks(MAX_FRAME_PAYLOAD).enumerate() {
            let kind = FrameKind::for_chunk(i * MAX_FRAME_PAYLOAD, chunk.len(), total);
            self.write_frame(Frame::new(kind, chunk.to_vec()))?;
        }
        Ok(())
    }

    fn write_frame(&mut self, frame: Frame) -> Result<()> {
        let encoded = frame.encode();
        self.writer.write_all(&encoded)?;
        self.file_size += encoded.len() as u64;
        Ok(())
    }

    /// Flush and fsync regardless of the sync setting.
    pub fn sync(&mut self) -> Result<()> {
        self.writer.flush()?;
        self.writer.get_ref().sync_all()?;
        Ok(())
    }

    /// Get the current file size
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Get the path to the journal file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for JournalWriter {
    fn drop(&mut self) {
        // Best effort flush on drop
        let _ = self.writer.flush();
    }
}
