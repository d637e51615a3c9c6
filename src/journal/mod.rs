//! Durable journal of filter mutations.
//!
//! Every `add` and `remove` is appended as a [`JournalEntry`]. Replaying the
//! journal in order rebuilds both the bit array (every `Add` sets bits, even
//! for items removed later) and the exact membership set.
//!
//! ## Architecture
//!
//! - **Entry encoding**: `bincode` over a serde-derived enum
//! - **Framing**: CRC32-checked frames, large entries split into fragments
//! - **Recovery**: replay stops at the first damaged frame and keeps the prefix
//! - **Compaction**: the journal can be rewritten as one `Add` per distinct
//!   item ever added plus one `Remove` per item no longer present
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bloomlist::journal::{Journal, JournalEntry};
//!
//! # fn main() -> Result<(), bloomlist::Error> {
//! let mut journal = Journal::open("filter_data.bin", true)?;
//! journal.append(&JournalEntry::Add("www.example.com".into()))?;
//! journal.append(&JournalEntry::Remove("www.example.com".into()))?;
//!
//! for entry in Journal::replay("filter_data.bin")? {
//!     println!("Recovered: {:?}", entry);
//! }
//! # Ok(())
//! # }
//! ```

pub mod reader;
pub mod record;
pub mod writer;

pub use reader::JournalReader;
pub use record::{Frame, FrameKind};
pub use writer::JournalWriter;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// One recorded mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JournalEntry {
    /// The item was added.
    Add(String),
    /// The item was removed.
    Remove(String),
}

impl JournalEntry {
    /// Encode with bincode.
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode with bincode.
    pub fn decode(data: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(data)?)
    }
}

/// Outcome of reading a journal back.
#[derive(Debug, Default)]
pub struct Replay {
    /// Every intact entry, in order.
    pub entries: Vec<JournalEntry>,
    /// Offset just past the last intact entry.
    pub valid_len: u64,
    /// Whether anything after `valid_len` had to be discarded.
    pub damaged: bool,
}

/// Journal handle that appends entries to one file.
pub struct Journal {
    writer: JournalWriter,
    entries: u64,
}

impl Journal {
    /// Open or create the journal at `path` for appending.
    pub fn open<P: AsRef<Path>>(path: P, sync: bool) -> Result<Self> {
        let writer = JournalWriter::open(path, sync)?;
        Ok(Self { writer, entries: 0 })
    }

    /// Open the journal, noting that it already holds `entries` entries.
    pub fn open_with_count<P: AsRef<Path>>(path: P, sync: bool, entries: u64) -> Result<Self> {
        let mut journal = Self::open(path, sync)?;
        journal.entries = entries;
        Ok(journal)
    }

    /// Append an entry.
    pub fn append(&mut self, entry: &JournalEntry) -> Result<()> {
        let data = entry.encode()?;
        self.writer.append(&data)?;
        self.entries += 1;
        Ok(())
    }

    /// Number of entries in the file, as far as this handle knows.
    pub fn entries(&self) -> u64 {
        self.entries
    }

    /// Get the current file size
    pub fn size(&self) -> u64 {
        self.writer.file_size()
    }

    /// Get the path to the journal file
    pub fn path(&self) -> &Path {
        self.writer.path()
    }

    /// Read back every intact entry of the journal at `path`.
    pub fn replay<P: AsRef<Path>>(path: P) -> Result<Vec<JournalEntry>> {
        Ok(Self::recover(path)?.entries)
    }

    /// Read back the journal at `path`, noting where the intact prefix ends.
    ///
    /// A damaged frame, an entry that frames correctly but does not decode,
    /// or trailing bytes too short to form a frame all end the replay; the
    /// entries before them are kept.
    pub fn recover<P: AsRef<Path>>(path: P) -> Result<Replay> {
        let mut reader = JournalReader::open(path)?;
        let mut replay = Replay::default();

        loop {
            let data = match reader.read_next() {
                Ok(Some(data)) => data,
                Ok(None) => break,
                Err(e @ (Error::Corruption(_) | Error::ChecksumMismatch { .. })) => {
                    log::warn!("Journal damaged after {} entries: {}", replay.entries.len(), e);
                    replay.damaged = true;
                    break;
                }
                Err(e) => return Err(e),
            };

            match JournalEntry::decode(&data) {
                Ok(entry) => {
                    replay.entries.push(entry);
                    replay.valid_len = reader.position();
                }
                Err(e) => {
                    log::warn!("Undecodable journal entry after {} entries: {}", replay.entries.len(), e);
                    replay.damaged = true;
                    break;
                }
            }
        }

        if reader.file_len()? > replay.valid_len {
            replay.damaged = true;
        }
        Ok(replay)
    }

    /// Replace the journal at `path` with `entries`, returning a handle that
    /// appends to the new file.
    ///
    /// The entries are written to a sibling file which is then renamed over
    /// `path`, so a crash leaves either the old journal or the new one.
    pub fn rewrite<P, I>(path: P, entries: I, sync: bool) -> Result<Self>
    where
        P: AsRef<Path>,
        I: IntoIterator<Item = JournalEntry>,
    {
        let path = path.as_ref();
        let tmp_path = Self::tmp_path(path);

        let mut count = 0u64;
        {
            let mut writer = JournalWriter::create(&tmp_path, false)?;
            for entry in entries {
                writer.append(&entry.encode()?)?;
                count += 1;
            }
            writer.sync()?;
        }

        if let Err(e) = std::fs::rename(&tmp_path, path) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        Self::open_with_count(path, sync, count)
    }

    fn tmp_path(path: &Path) -> PathBuf {
        let mut name = path.file_name().map(OsString::from).unwrap_or_default();
        name.push(".compact");
        path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn add(item: &str) -> JournalEntry {
        JournalEntry::Add(item.to_owned())
    }

    fn remove(item: &str) -> JournalEntry {
        JournalEntry::Remove(item.to_owned())
    }

    #[test]
    fn test_append_and_replay() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("journal.bin");

        let expected = vec![add("a.com"), add("b.com"), remove("a.com"), add("")];
        {
            let mut journal = Journal::open(&path, false).unwrap();
            for entry in &expected {
                journal.append(entry).unwrap();
            }
            assert_eq!(journal.entries(), 4);
            assert!(journal.size() > 0);
        }

        assert_eq!(Journal::replay(&path).unwrap(), expected);
    }

    #[test]
    fn test_long_item_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("journal.bin");
        let long = "a".repeat(100_000);

        Journal::open(&path, true).unwrap().append(&add(&long)).unwrap();

        assert_eq!(Journal::replay(&path).unwrap(), vec![add(&long)]);
    }

    #[test]
    fn test_replay_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        assert!(Journal::replay(dir.path().join("absent.bin")).is_err());
    }

    #[test]
    fn test_rewrite_replaces_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("journal.bin");

        {
            let mut journal = Journal::open(&path, false).unwrap();
            for _ in 0..10 {
                journal.append(&add("a.com")).unwrap();
                journal.append(&remove("a.com")).unwrap();
            }
        }

        let mut journal = Journal::rewrite(&path, vec![add("a.com"), remove("a.com")], false).unwrap();
        assert_eq!(journal.entries(), 2);
        journal.append(&add("b.com")).unwrap();
        drop(journal);

        assert_eq!(Journal::replay(&path).unwrap(), vec![add("a.com"), remove("a.com"), add("b.com")]);
        assert!(!Journal::tmp_path(&path).exists());
    }

    #[test]
    fn test_recover_flags_trailing_bytes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("journal.bin");

        Journal::open(&path, false).unwrap().append(&add("a.com")).unwrap();
        let clean = Journal::recover(&path).unwrap();
        assert!(!clean.damaged);
        assert_eq!(clean.valid_len, std::fs::metadata(&path).unwrap().len());

        // Shorter than a frame header
        {
            use std::io::Write;
            let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
            file.write_all(&[1, 2, 3]).unwrap();
        }
        let torn = Journal::recover(&path).unwrap();
        assert!(torn.damaged);
        assert_eq!(torn.entries, vec![add("a.com")]);
        assert_eq!(torn.valid_len, clean.valid_len);
    }

    #[test]
    fn test_entry_encoding_is_stable() {
        let entry = add("www.example.com");
        let encoded = entry.encode().unwrap();
        assert_eq!(JournalEntry::decode(&encoded).unwrap(), entry);
        assert!(JournalEntry::decode(&[0xff, 0xff, 0xff, 0xff]).is_err());
    }
}
