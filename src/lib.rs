//! Agentedit: agent-facing file editing core
//!
//! The editing primitive for agents that mutate files by example: given a
//! target file, a snippet expected to appear exactly once, and a
//! replacement, produce the new content, a line-oriented patch of the
//! change, and a best-effort git commit of the result.
//!
//! # Architecture
//!
//! Every edit runs the same pipeline: freshness check, unique-match
//! location ([`matcher`]), patch build ([`patch`]), atomic write
//! ([`codec`]), git snapshot ([`git`]). Callers may hold slightly stale
//! knowledge of the file (trailing-whitespace drift from formatters), so
//! matching is forgiving about trailing whitespace but refuses to guess
//! when a match is ambiguous.
//!
//! # Safety
//!
//! - Exactly one occurrence is ever replaced; zero or several is an error
//! - Atomic file writes (tempfile + fsync + rename)
//! - Optional read-before-write freshness invariant per file
//! - Commit failures are informational, never fatal to the edit
//!
//! # Example
//!
//! ```no_run
//! use agentedit::edit_file;
//! use std::path::Path;
//!
//! let message = edit_file(
//!     Path::new("src/main.rs"),
//!     "println!(\"hello\")",
//!     "println!(\"goodbye\")",
//!     None,
//!     "Change greeting",
//! );
//! println!("{message}");
//! ```

pub mod codec;
pub mod engine;
pub mod freshness;
pub mod git;
pub mod matcher;
pub mod patch;
pub mod snippet;
pub mod suggest;

// Re-exports
pub use codec::{FileEncoding, LineEnding};
pub use engine::{edit_file, edit_file_content, EditError, EditOutcome, EditRequest};
pub use freshness::{Freshness, ReadTimestamps};
pub use git::CommitOutcome;
pub use matcher::{MatchError, MatchResult};
pub use patch::{Hunk, PatchLine};
