//! Read-before-write freshness tracking.
//!
//! A process-wide host keeps one [`ReadTimestamps`] per session and records
//! an entry whenever the agent reads a file. An edit is only allowed when the
//! file's on-disk modification time is no newer than the recorded read: a
//! newer mtime means a human, a linter, or a concurrent process wrote to the
//! file after the caller last saw it.
//!
//! This is optimistic concurrency, not mutual exclusion. Two concurrent edits
//! with no intervening read-refresh can both pass the check and race at the
//! write step; the last writer wins. Accepted trade-off over per-file
//! locking.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use filetime::FileTime;

/// Freshness verdict for a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Recorded read is at least as recent as the on-disk mtime.
    Fresh,
    /// Tracking is enabled but the path was never read.
    NeverRead,
    /// The file was modified after the recorded read.
    Stale,
}

/// Shared table of absolute path -> last-known-good read instant.
///
/// Cloning is cheap and clones share the same table. Mutated only by
/// successful reads and successful writes; never persisted.
#[derive(Debug, Clone, Default)]
pub struct ReadTimestamps {
    inner: Arc<Mutex<HashMap<PathBuf, FileTime>>>,
}

impl ReadTimestamps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `path` was read when its mtime was `instant`.
    pub fn record_read(&self, path: impl Into<PathBuf>, instant: FileTime) {
        self.lock().insert(path.into(), instant);
    }

    /// Record a read of `path` using its current on-disk mtime.
    pub fn record_read_from_disk(&self, path: &Path) -> io::Result<()> {
        let mtime = FileTime::from_last_modification_time(&std::fs::metadata(path)?);
        self.record_read(path, mtime);
        Ok(())
    }

    /// Check `path` against its current on-disk mtime.
    ///
    /// Stale only when the disk mtime is strictly newer than the recorded
    /// read instant.
    pub fn check(&self, path: &Path, disk_mtime: FileTime) -> Freshness {
        match self.lock().get(path) {
            None => Freshness::NeverRead,
            Some(read_at) if disk_mtime > *read_at => Freshness::Stale,
            Some(_) => Freshness::Fresh,
        }
    }

    /// Refresh the recorded instant to the file's current mtime, after a
    /// successful write.
    pub fn refresh_from_disk(&self, path: &Path) -> io::Result<()> {
        self.record_read_from_disk(path)
    }

    /// Last recorded read instant for `path`, if any.
    pub fn get(&self, path: &Path) -> Option<FileTime> {
        self.lock().get(path).copied()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<PathBuf, FileTime>> {
        // A poisoned map still holds valid timestamps.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
