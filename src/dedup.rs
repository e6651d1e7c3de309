//! Deduplication store with an append-only durable log.
//!
//! The store is the authoritative source of "already delivered". It holds an
//! in-memory set of content keys, backed by a flat text log: one key per
//! line, no header, no checksum. The log is loaded once at startup and only
//! ever appended to afterwards.
//!
//! # Durability model
//!
//! The in-memory insert always happens, even if the durable append fails. A
//! crash after a failed append therefore risks at most a future duplicate
//! send; it never loses the in-memory guarantee for the current process. The
//! log file is opened, appended, fsynced, and closed per write, so no handle
//! is held across deliveries.

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::types::ContentKey;

/// The set of content keys that have been delivered, with durable backing.
///
/// Owned by whichever component drives delivery; single writer by
/// construction (the relay processes one message at a time).
#[derive(Debug)]
pub struct DedupStore {
    seen: HashSet<ContentKey>,
    log_path: PathBuf,
}

impl DedupStore {
    /// Loads the store from the durable log.
    ///
    /// Call exactly once at startup, before any inbound event is processed.
    /// A missing log file means "empty history" and is not an error. Any
    /// other read failure is logged and the store keeps whatever was loaded
    /// up to that point; loading never fails.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let log_path = path.into();
        let mut seen = HashSet::new();

        match File::open(&log_path) {
            Ok(file) => {
                let mut reader = BufReader::new(file);
                let mut line = String::new();
                loop {
                    line.clear();
                    match reader.read_line(&mut line) {
                        Ok(0) => break,
                        Ok(_) => {
                            let key = line.trim_end();
                            if !key.is_empty() {
                                seen.insert(ContentKey::new(key));
                            }
                        }
                        Err(e) => {
                            warn!(
                                path = %log_path.display(),
                                error = %e,
                                "failed reading dedup log; continuing with keys loaded so far"
                            );
                            break;
                        }
                    }
                }
                info!(count = seen.len(), path = %log_path.display(), "loaded delivered-video history");
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %log_path.display(), "no dedup log found; starting with empty history");
            }
            Err(e) => {
                warn!(
                    path = %log_path.display(),
                    error = %e,
                    "failed opening dedup log; starting with empty history"
                );
            }
        }

        DedupStore { seen, log_path }
    }

    /// Whether this content key has already been delivered.
    pub fn is_processed(&self, key: &ContentKey) -> bool {
        self.seen.contains(key)
    }

    /// Records a content key as delivered.
    ///
    /// The in-memory insert happens unconditionally. A failure to append to
    /// the durable log is logged as an error and otherwise swallowed: it
    /// risks one duplicate send after a restart, which is preferable to
    /// failing the delivery that already happened.
    pub fn mark_processed(&mut self, key: ContentKey) {
        self.seen.insert(key.clone());

        if let Err(e) = self.append_key(&key) {
            error!(
                content_key = %key,
                path = %self.log_path.display(),
                error = %e,
                "failed to append to dedup log; key is held in memory only"
            );
        }
    }

    /// Appends one key line to the log, fsyncing before close.
    fn append_key(&self, key: &ContentKey) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;
        writeln!(file, "{}", key.as_str())?;
        file.sync_all()
    }

    /// Number of keys currently held.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Path of the durable log backing this store.
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }
}
