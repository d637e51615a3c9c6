//! The filter facade.
//!
//! [`Blacklist`] pairs a [`BloomFilter`] with a [`ShadowSet`] and journals
//! every mutation. It is the single authoritative state shared by all front
//! ends; mutations are serialized behind one write lock so that readers never
//! see the bit array and the shadow set out of step.

use crate::config::{FilterConfig, Options};
use crate::error::{Error, Result};
use crate::filter::{BloomFilter, ShadowSet};
use crate::journal::{Journal, JournalEntry, Replay};
use parking_lot::RwLock;
use std::io;
use std::path::{Path, PathBuf};

/// Combined answer of the Bloom engine and the shadow set for one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The Bloom engine rules the item out.
    Absent,
    /// The Bloom engine matches and the item is really present.
    Present,
    /// The Bloom engine matches but the item is not present.
    FalsePositive,
}

impl Verdict {
    /// The Bloom engine's answer.
    pub fn check(self) -> bool {
        !matches!(self, Verdict::Absent)
    }

    /// The exact answer.
    pub fn double_check(self) -> bool {
        matches!(self, Verdict::Present)
    }
}

struct FilterState {
    bloom: BloomFilter,
    shadow: ShadowSet,
    journal: Option<Journal>,
}

impl FilterState {
    fn apply(&mut self, entry: &JournalEntry) -> bool {
        match entry {
            JournalEntry::Add(item) => {
                self.shadow.insert(item);
                self.bloom.set_bits(item.as_bytes());
                true
            }
            JournalEntry::Remove(item) => self.shadow.remove(item),
        }
    }

    /// Journal `entry`. Failures only cost durability, so they are logged and
    /// dropped.
    fn persist(&mut self, entry: JournalEntry) {
        let Some(journal) = self.journal.as_mut() else {
            log::debug!("No journal attached, {:?} kept in memory only", entry);
            return;
        };
        if let Err(e) = journal.append(&entry) {
            log::warn!("Failed to journal {:?} to {:?}: {}", entry, journal.path(), e);
        }
    }

    /// Number of entries the compacted journal would hold.
    fn compacted_len(&self) -> u64 {
        let history = self.shadow.history_len();
        (2 * history - self.shadow.len()) as u64
    }

    fn compacted_entries(&self) -> Vec<JournalEntry> {
        let mut entries: Vec<JournalEntry> =
            self.shadow.history().map(|item| JournalEntry::Add(item.to_owned())).collect();
        entries.extend(
            self.shadow
                .history()
                .filter(|item| !self.shadow.contains(item))
                .map(|item| JournalEntry::Remove(item.to_owned())),
        );
        entries
    }
}

/// Bloom filter URL blacklist with exact verification and a durable journal.
///
/// # Thread Safety
///
/// `Blacklist` is `Send + Sync` and meant to be shared through an `Arc`.
/// `check` and `double_check` take a shared lock; `add`, `remove` and
/// `compact` take the exclusive lock for the in-memory update and the
/// journal write together.
///
/// # Example
///
/// ```rust,no_run
/// use bloomlist::{Blacklist, FilterConfig, Options};
///
/// let config = FilterConfig::new(16, vec![1]).unwrap();
/// let blacklist = Blacklist::open("filter_data.bin", config, Options::default());
///
/// blacklist.add("test.com");
/// assert!(blacklist.check("test.com"));
/// assert!(blacklist.double_check("test.com"));
///
/// blacklist.remove("test.com");
/// assert!(blacklist.check("test.com"));
/// assert!(!blacklist.double_check("test.com"));
/// ```
pub struct Blacklist {
    path: PathBuf,
    config: FilterConfig,
    options: Options,
    state: RwLock<FilterState>,
}

impl Blacklist {
    /// Opens the filter backed by the journal at `path`.
    ///
    /// An existing journal is replayed under `config`. A missing or unreadable
    /// journal leaves the filter empty, a damaged one is cut back to its
    /// intact prefix, and a journal that cannot be opened for writing leaves
    /// the filter running in memory only. None of these is an error.
    pub fn open<P: AsRef<Path>>(path: P, config: FilterConfig, options: Options) -> Self {
        let path = path.as_ref().to_path_buf();

        let mut state = FilterState {
            bloom: BloomFilter::new(&config),
            shadow: ShadowSet::new(),
            journal: None,
        };

        let replay = match Journal::recover(&path) {
            Ok(replay) => replay,
            Err(Error::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("No journal at {:?}, starting empty", path);
                Replay::default()
            }
            Err(e) => {
                log::warn!("Cannot read journal {:?}, starting empty: {}", path, e);
                Replay::default()
            }
        };
        for entry in &replay.entries {
            state.apply(entry);
        }
        let replayed = replay.entries.len() as u64;

        // A damaged tail must not stay in front of new appends
        let rewrite = replay.damaged || (options.compact_on_open && replayed > state.compacted_len());
        state.journal = if rewrite {
            match Journal::rewrite(&path, state.compacted_entries(), options.sync_journal) {
                Ok(journal) => {
                    log::info!(
                        "Rewrote journal {:?} from {} to {} entries",
                        path,
                        replayed,
                        journal.entries()
                    );
                    Some(journal)
                }
                Err(e) => {
                    log::warn!("Journal rewrite of {:?} failed: {}", path, e);
                    Self::attach_journal(&path, &options, replayed)
                }
            }
        } else {
            Self::attach_journal(&path, &options, replayed)
        };

        log::info!(
            "Opened blacklist {:?} ({}): {} entries replayed, {} present, {}/{} bits set",
            path,
            config,
            replayed,
            state.shadow.len(),
            state.bloom.count_ones(),
            state.bloom.num_bits()
        );

        Self { path, config, options, state: RwLock::new(state) }
    }

    fn attach_journal(path: &Path, options: &Options, entries: u64) -> Option<Journal> {
        match Journal::open_with_count(path, options.sync_journal, entries) {
            Ok(journal) => Some(journal),
            Err(e) => {
                log::warn!("Cannot open journal {:?} for writing, changes will not persist: {}", path, e);
                None
            }
        }
    }

    /// Adds `item` to the blacklist.
    pub fn add(&self, item: &str) {
        let mut state = self.state.write();
        let entry = JournalEntry::Add(item.to_owned());
        state.apply(&entry);
        state.persist(entry);
    }

    /// Bloom engine membership: false means definitely absent, true means
    /// possibly present.
    pub fn check(&self, item: &str) -> bool {
        self.state.read().bloom.test_bits(item.as_bytes())
    }

    /// Exact membership: true only if `item` was added and not removed since.
    pub fn double_check(&self, item: &str) -> bool {
        self.state.read().shadow.contains(item)
    }

    /// `check` followed by `double_check`, both against the same state.
    pub fn lookup(&self, item: &str) -> Verdict {
        let state = self.state.read();
        if !state.bloom.test_bits(item.as_bytes()) {
            Verdict::Absent
        } else if state.shadow.contains(item) {
            Verdict::Present
        } else {
            Verdict::FalsePositive
        }
    }

    /// Removes `item` from the exact set, returning whether it was present.
    ///
    /// Its Bloom bits stay set, so `check` may keep answering true.
    pub fn remove(&self, item: &str) -> bool {
        let mut state = self.state.write();
        let entry = JournalEntry::Remove(item.to_owned());
        let was_present = state.apply(&entry);
        if was_present {
            state.persist(entry);
        }
        was_present
    }

    /// Rewrites the journal into its compact form.
    pub fn compact(&self) -> Result<()> {
        let mut state = self.state.write();
        let journal = Journal::rewrite(&self.path, state.compacted_entries(), self.options.sync_journal)?;
        log::info!("Compacted journal {:?} to {} entries", self.path, journal.entries());
        state.journal = Some(journal);
        Ok(())
    }

    /// The configuration this filter was built with.
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Path of the backing journal.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of items currently present.
    pub fn len(&self) -> usize {
        self.state.read().shadow.len()
    }

    /// Returns true if no item is currently present.
    pub fn is_empty(&self) -> bool {
        self.state.read().shadow.is_empty()
    }

    /// Whether mutations are currently being journaled.
    pub fn is_durable(&self) -> bool {
        self.state.read().journal.is_some()
    }
}
