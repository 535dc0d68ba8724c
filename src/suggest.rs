//! Sibling-file suggestion for edits that target a nonexistent path.
//!
//! Agents frequently hold a stale extension (`lib.ts` vs `lib.rs`); when the
//! requested file does not exist, a same-stem sibling in the same directory
//! is offered as a hint in the error message.

use std::fs;
use std::path::{Path, PathBuf};

/// Find a file in the same directory with the same stem but a different
/// extension. When several candidates exist, the one whose name is closest
/// to the requested name (Jaro-Winkler) wins.
pub fn find_similar_file(path: &Path) -> Option<PathBuf> {
    let directory = path.parent()?;
    let stem = path.file_stem()?.to_str()?;
    let target_name = path.file_name()?.to_str()?;
    let prefix = format!("{stem}.");

    let mut best: Option<(f64, PathBuf)> = None;
    for entry in fs::read_dir(directory).ok()?.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if name == target_name || !name.starts_with(&prefix) {
            continue;
        }
        let score = strsim::jaro_winkler(name, target_name);
        if best.as_ref().map_or(true, |(s, _)| score > *s) {
            best = Some((score, entry.path()));
        }
    }

    best.map(|(_, path)| path)
}
