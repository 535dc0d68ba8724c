//! Bounded excerpt of an edited file for display in the success message.

/// Context lines shown on each side of the replacement.
const CONTEXT_LINES: usize = 4;

/// Build a numbered snippet of the updated content around the change.
///
/// `original` is the pre-edit content and `old_text` the literal span that
/// was replaced; the snippet shows the post-edit text with 1-based line
/// numbers.
pub fn edit_snippet(original: &str, old_text: &str, new_text: &str) -> String {
    let before = original.split(old_text).next().unwrap_or("");
    let start_line = before.matches('\n').count();

    let updated = original.replacen(old_text, new_text, 1);
    let lines: Vec<&str> = updated.split('\n').collect();

    let first = start_line.saturating_sub(CONTEXT_LINES);
    let last = lines
        .len()
        .min(start_line + new_text.matches('\n').count() + CONTEXT_LINES + 1);

    lines[first..last]
        .iter()
        .enumerate()
        .map(|(i, line)| format!("{}: {}", first + i + 1, line))
        .collect::<Vec<_>>()
        .join("\n")
}
