//! Locates the unique occurrence of an expected text block in file content.
//!
//! Two passes: an exact substring pass, then a whitespace-tolerant fallback
//! that ignores trailing whitespace on every line. The fallback resolves the
//! file's *actual* untrimmed text so the replacement never alters bytes the
//! caller did not ask to change.

use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

/// A unique match of the expected old text within file content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    /// The literal span found in the file. May differ from the caller's
    /// expected text only in per-line trailing whitespace.
    pub text: String,
    /// Byte offset of the match within the content.
    pub offset: usize,
    /// 0-based line on which the match starts.
    pub line: usize,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum MatchError {
    #[error("text to replace not found in content")]
    NotFound,

    #[error("text matched {count} locations, expected exactly 1")]
    Ambiguous { count: usize },
}

/// Find exactly one occurrence of `old_text` in `content`.
///
/// Exact pass first: one occurrence succeeds, multiple fail immediately with
/// [`MatchError::Ambiguous`] (an ambiguous exact match is never resolved by
/// loosening the criteria). Zero occurrences fall through to the
/// whitespace-tolerant pass.
///
/// `old_text` must be non-empty; empty old text means file creation and is
/// handled before the matcher is ever invoked.
pub fn find_unique(content: &str, old_text: &str) -> Result<MatchResult, MatchError> {
    match content.matches(old_text).count() {
        1 => {
            let offset = content.find(old_text).expect("count checked == 1");
            Ok(MatchResult {
                text: old_text.to_string(),
                offset,
                line: content[..offset].matches('\n').count(),
            })
        }
        0 => {
            log_mismatch(content, old_text);
            find_trimmed(content, old_text)
        }
        count => Err(MatchError::Ambiguous { count }),
    }
}

/// Whitespace-tolerant fallback: match after right-trimming every line of
/// both sides, then recover the actual untrimmed span from the content.
fn find_trimmed(content: &str, old_text: &str) -> Result<MatchResult, MatchError> {
    let content_lines: Vec<&str> = content.split('\n').collect();
    let old_lines: Vec<&str> = old_text.split('\n').collect();

    let trimmed_content = right_trim_lines(&content_lines);
    let trimmed_old = right_trim_lines(&old_lines);

    if !trimmed_content.contains(&trimmed_old) {
        return Err(MatchError::NotFound);
    }

    if old_lines.len() > content_lines.len() {
        return Err(MatchError::NotFound);
    }

    // Slide a window of the same line count over the original lines and take
    // the first one that matches after right-trimming.
    for start in 0..=(content_lines.len() - old_lines.len()) {
        let window = &content_lines[start..start + old_lines.len()];
        if window
            .iter()
            .zip(&old_lines)
            .all(|(have, want)| have.trim_end() == want.trim_end())
        {
            let resolved = window.join("\n");
            tracing::debug!(line = start, "matched after trailing-whitespace strip");

            // The resolved literal must still be unique in the real content.
            let count = content.matches(&resolved).count();
            if count > 1 {
                return Err(MatchError::Ambiguous { count });
            }

            let offset = content.find(&resolved).expect("window came from content");
            return Ok(MatchResult {
                text: resolved,
                offset,
                line: start,
            });
        }
    }

    // The trimmed containment hit was not line-aligned (e.g. the block
    // started mid-line), so no candidate exists.
    Err(MatchError::NotFound)
}

fn right_trim_lines(lines: &[&str]) -> String {
    lines
        .iter()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Diagnostic side channel for the no-exact-match path. Never control flow.
fn log_mismatch(content: &str, old_text: &str) {
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return;
    }
    let content_hash = format!("{:016x}", xxh3_64(content.as_bytes()));
    let old_hash = format!("{:016x}", xxh3_64(old_text.as_bytes()));
    tracing::debug!(
        content_len = content.len(),
        old_len = old_text.len(),
        %content_hash,
        %old_hash,
        "exact match failed, trying whitespace-tolerant fallback"
    );
    // First expected line with no right-trimmed counterpart in the content,
    // which is usually the line the caller has stale.
    let content_trimmed: Vec<&str> = content.split('\n').map(str::trim_end).collect();
    if let Some(missing) = old_text
        .split('\n')
        .map(str::trim_end)
        .find(|line| !line.is_empty() && !content_trimmed.contains(line))
    {
        tracing::debug!(line = missing, "expected line absent from content");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_single_match() {
        let m = find_unique("foo\nbar\nbaz\n", "bar").unwrap();
        assert_eq!(m.text, "bar");
        assert_eq!(m.offset, 4);
        assert_eq!(m.line, 1);
    }

    #[test]
    fn exact_multiline_match() {
        let m = find_unique("a\nb\nc\nd\n", "b\nc").unwrap();
        assert_eq!(m.text, "b\nc");
        assert_eq!(m.line, 1);
    }

    #[test]
    fn ambiguous_exact_match() {
        let result = find_unique("bar\nbar\n", "bar");
        assert_eq!(result, Err(MatchError::Ambiguous { count: 2 }));
    }

    #[test]
    fn ambiguous_fails_before_fallback() {
        // Both occurrences carry trailing spaces; the exact pass still sees
        // two matches of the untrimmed text and must not loosen.
        let result = find_unique("bar  \nbar  \n", "bar  ");
        assert_eq!(result, Err(MatchError::Ambiguous { count: 2 }));
    }

    #[test]
    fn not_found() {
        let result = find_unique("foo\nbar\n", "qux");
        assert_eq!(result, Err(MatchError::NotFound));
    }

    #[test]
    fn fallback_resolves_actual_trailing_whitespace() {
        // File has trailing spaces the caller's expected text lacks.
        let content = "fn main() {  \n    body();\t\n}\n";
        let m = find_unique(content, "fn main() {\n    body();\n}").unwrap();
        assert_eq!(m.text, "fn main() {  \n    body();\t\n}");
        assert_eq!(m.offset, 0);
        assert_eq!(m.line, 0);
    }

    #[test]
    fn fallback_caller_has_extra_whitespace() {
        let content = "alpha\nbeta\ngamma\n";
        let m = find_unique(content, "beta   \ngamma").unwrap();
        assert_eq!(m.text, "beta\ngamma");
        assert_eq!(m.line, 1);
    }

    #[test]
    fn fallback_first_window_wins() {
        let content = "x \ny\nz\nx\t\ny\n";
        let m = find_unique(content, "x\ny").unwrap();
        // Two windows match after trimming; the first one is taken and its
        // resolved literal "x \ny" is unique in the original content.
        assert_eq!(m.text, "x \ny");
        assert_eq!(m.line, 0);
    }

    #[test]
    fn fallback_ambiguous_resolved_text() {
        // The resolved window text occurs twice verbatim; caller's version
        // (with trailing space) occurs zero times exactly.
        let content = "a\nb\na\nb\n";
        let result = find_unique(content, "a \nb");
        assert_eq!(result, Err(MatchError::Ambiguous { count: 2 }));
    }

    #[test]
    fn fallback_mid_line_containment_is_not_a_match() {
        // Trimmed containment can hit mid-line; no line-aligned window exists.
        let content = "xxab\ncdyy\n";
        let result = find_unique(content, "ab \ncd");
        assert_eq!(result, Err(MatchError::NotFound));
    }

    #[test]
    fn old_text_longer_than_content() {
        let result = find_unique("a\n", "a\nb\nc");
        assert_eq!(result, Err(MatchError::NotFound));
    }
}
