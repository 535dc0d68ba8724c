//! Line-oriented patch description of a single replacement.
//!
//! Each edit call performs exactly one contiguous replacement, so a patch is
//! always a single hunk. The hunk is a display/audit artifact; it is never
//! used to re-apply the change.

use serde::Serialize;
use std::fmt;

use crate::matcher::MatchResult;

/// One line of a hunk body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "line", rename_all = "lowercase")]
pub enum PatchLine {
    Removed(String),
    Added(String),
}

/// A single contiguous line-range replacement.
///
/// Start lines are 1-based. Removed lines come first, then added lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hunk {
    pub old_start: usize,
    pub old_lines: usize,
    pub new_start: usize,
    pub new_lines: usize,
    pub lines: Vec<PatchLine>,
}

/// Build the hunk for replacing a located match with `new_text`.
///
/// The starting line is derived from the match position: the count of line
/// breaks preceding the match, plus one.
pub fn build_hunk(m: &MatchResult, new_text: &str) -> Hunk {
    let start = m.line + 1;
    let old_lines: Vec<&str> = m.text.split('\n').collect();
    let new_lines: Vec<&str> = new_text.split('\n').collect();

    let mut lines = Vec::with_capacity(old_lines.len() + new_lines.len());
    lines.extend(old_lines.iter().map(|l| PatchLine::Removed(l.to_string())));
    lines.extend(new_lines.iter().map(|l| PatchLine::Added(l.to_string())));

    Hunk {
        old_start: start,
        old_lines: old_lines.len(),
        new_start: start,
        new_lines: new_lines.len(),
        lines,
    }
}

impl fmt::Display for Hunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "@@ -{},{} +{},{} @@",
            self.old_start, self.old_lines, self.new_start, self.new_lines
        )?;
        for line in &self.lines {
            match line {
                PatchLine::Removed(l) => writeln!(f, "-{l}")?,
                PatchLine::Added(l) => writeln!(f, "+{l}")?,
            }
        }
        Ok(())
    }
}
