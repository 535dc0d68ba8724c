//! Mutation engine: the match-validate-patch-commit pipeline.
//!
//! Pipeline order for a non-empty old text: freshness check, existence and
//! file-category checks, matcher, patch build, atomic write, timestamp
//! refresh, best-effort git commit. Match and patch computation fully precede
//! the single write, so a failed edit never leaves a partial write on disk.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use filetime::FileTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::codec::{self, FileEncoding, LineEnding};
use crate::freshness::{Freshness, ReadTimestamps};
use crate::git::{self, CommitOutcome};
use crate::matcher::{self, MatchError};
use crate::patch::{self, Hunk};
use crate::snippet;
use crate::suggest;

/// One file-edit request as supplied by the dispatch layer.
///
/// An empty `old_text` requests file creation. The path is resolved to an
/// absolute form before any comparison or I/O.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditRequest {
    pub path: PathBuf,
    pub old_text: String,
    pub new_text: String,
    #[serde(default)]
    pub description: String,
}

impl EditRequest {
    /// Run the full pipeline for this request.
    pub fn apply(&self, timestamps: Option<&ReadTimestamps>) -> Result<EditOutcome, EditError> {
        edit_file_content(
            &self.path,
            &self.old_text,
            &self.new_text,
            timestamps,
            &self.description,
        )
    }
}

/// Result of a successful (or non-mutating) edit call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// A new file was created with exactly the requested content.
    Created {
        path: PathBuf,
        commit: CommitOutcome,
    },
    /// The unique match was replaced and the file rewritten.
    Edited {
        path: PathBuf,
        patch: Hunk,
        snippet: String,
        commit: CommitOutcome,
    },
    /// Old and new text are identical; nothing was written or committed.
    NoOp,
}

#[derive(Error, Debug)]
pub enum EditError {
    #[error("Cannot create new file - file already exists.")]
    AlreadyExists,

    #[error("File does not exist: {}{}", .path.display(), suggestion_note(.suggestion))]
    NotFound {
        path: PathBuf,
        suggestion: Option<PathBuf>,
    },

    #[error("File is a Jupyter Notebook. Use a notebook editor to edit this file.")]
    ExcludedCategory { path: PathBuf },

    #[error("File has not been read yet. Read it first before writing to it.")]
    NeverRead,

    #[error("File has been modified since read, either by the user or by a linter. Read it again before attempting to write it.")]
    Stale,

    #[error("String to replace not found in file.")]
    NotFoundInContent,

    #[error("Found {count} matches of the string to replace. For safety, this tool only supports replacing exactly one occurrence at a time. Add more lines of context to your edit and try again.")]
    AmbiguousMatch { count: usize },

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

fn suggestion_note(suggestion: &Option<PathBuf>) -> String {
    match suggestion {
        Some(path) => format!(" Did you mean {}?", path.display()),
        None => String::new(),
    }
}

impl From<MatchError> for EditError {
    fn from(e: MatchError) -> Self {
        match e {
            MatchError::NotFound => EditError::NotFoundInContent,
            MatchError::Ambiguous { count } => EditError::AmbiguousMatch { count },
        }
    }
}

/// Report whether a path belongs to a file category that needs a
/// specialized editor instead of text replacement.
pub fn excluded_category(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("ipynb")
}

/// Edit a file by replacing the unique occurrence of `old_text` with
/// `new_text`, or create it when `old_text` is empty.
///
/// `timestamps` enables the read-before-write freshness invariant; passing
/// `None` opts out and accepts the race with concurrent writers.
pub fn edit_file_content(
    path: &Path,
    old_text: &str,
    new_text: &str,
    timestamps: Option<&ReadTimestamps>,
    description: &str,
) -> Result<EditOutcome, EditError> {
    let path = absolutize(path)?;

    if old_text == new_text {
        return Ok(EditOutcome::NoOp);
    }

    if old_text.is_empty() {
        return create_file(&path, new_text, timestamps, description);
    }

    if !path.exists() {
        return Err(EditError::NotFound {
            suggestion: suggest::find_similar_file(&path),
            path,
        });
    }

    if excluded_category(&path) {
        return Err(EditError::ExcludedCategory { path });
    }

    if let Some(table) = timestamps {
        let disk_mtime = FileTime::from_last_modification_time(&fs::metadata(&path)?);
        match table.check(&path, disk_mtime) {
            Freshness::Fresh => {}
            Freshness::NeverRead => return Err(EditError::NeverRead),
            Freshness::Stale => return Err(EditError::Stale),
        }
    }

    let raw = fs::read(&path)?;
    let encoding = codec::sniff_encoding(&raw);
    let line_ending = codec::sniff_line_endings(&raw);
    let content = codec::normalize_line_endings(&codec::decode(&raw, encoding), LineEnding::Lf);

    let m = matcher::find_unique(&content, old_text)?;
    let hunk = patch::build_hunk(&m, new_text);
    let updated = content.replacen(&m.text, new_text, 1);

    codec::write_text(&path, &updated, encoding, line_ending)?;

    if let Some(table) = timestamps {
        table.refresh_from_disk(&path)?;
    }

    let snippet = snippet::edit_snippet(&content, &m.text, new_text);
    let commit = git::commit_changes(&path, description);

    tracing::debug!(
        path = %path.display(),
        old_start = hunk.old_start,
        committed = commit.is_committed(),
        "edit applied"
    );

    Ok(EditOutcome::Edited {
        path,
        patch: hunk,
        snippet,
        commit,
    })
}

/// Creation path: empty old text against a nonexistent target.
fn create_file(
    path: &Path,
    new_text: &str,
    timestamps: Option<&ReadTimestamps>,
    description: &str,
) -> Result<EditOutcome, EditError> {
    if path.exists() {
        return Err(EditError::AlreadyExists);
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    codec::write_text(path, new_text, FileEncoding::Utf8, LineEnding::Lf)?;

    if let Some(table) = timestamps {
        table.refresh_from_disk(path)?;
    }

    let commit = git::commit_changes(path, description);

    Ok(EditOutcome::Created {
        path: path.to_path_buf(),
        commit,
    })
}

/// Outer boundary of the mutation call: renders outcomes and errors to the
/// human-readable message contract. Never panics and never lets an I/O fault
/// escape; unexpected failures become the `"Error editing file:"` wrapper.
pub fn edit_file(
    path: &Path,
    old_text: &str,
    new_text: &str,
    timestamps: Option<&ReadTimestamps>,
    description: &str,
) -> String {
    match edit_file_content(path, old_text, new_text, timestamps, description) {
        Ok(EditOutcome::NoOp) => {
            "No changes to make: old_string and new_string are exactly the same.".to_string()
        }
        Ok(EditOutcome::Created { path, .. }) => {
            format!("Successfully created {}", path.display())
        }
        Ok(EditOutcome::Edited {
            path,
            snippet,
            commit,
            ..
        }) => format!(
            "Successfully edited {}\n\nHere's a snippet of the edited file:\n{}{}",
            path.display(),
            snippet,
            commit.as_note(description)
        ),
        Err(EditError::Io(e)) => format!("Error editing file: {e}"),
        Err(e) => format!("Error: {e}"),
    }
}

fn absolutize(path: &Path) -> std::io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(env::current_dir()?.join(path))
    }
}
