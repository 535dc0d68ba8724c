//! Best-effort git snapshot of a successful edit.
//!
//! Commit failures are reported in the edit result but never roll back the
//! file write; the edit is considered successful once written. All git
//! breakage (no repo, detached state, missing identity, missing binary)
//! collapses into [`CommitOutcome::Failed`].

use std::path::Path;
use std::process::Command;

/// Outcome of the post-edit commit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    Failed(String),
}

impl CommitOutcome {
    /// Informational suffix appended to the edit success message.
    pub fn as_note(&self, description: &str) -> String {
        match self {
            CommitOutcome::Committed => {
                format!("\n\nChanges committed to git: {description}")
            }
            CommitOutcome::Failed(message) => {
                format!("\n\nFailed to commit changes to git: {message}")
            }
        }
    }

    pub fn is_committed(&self) -> bool {
        matches!(self, CommitOutcome::Committed)
    }
}

/// Stage and commit `path` with `description` as the commit message.
///
/// Must be safe to call in any repository state; never panics and never
/// returns an error the caller has to handle.
pub fn commit_changes(path: &Path, description: &str) -> CommitOutcome {
    let directory = match path.parent() {
        Some(parent) => parent,
        None => return CommitOutcome::Failed("path has no parent directory".to_string()),
    };

    let root = match git_in(directory, &["rev-parse", "--show-toplevel"]) {
        Ok(stdout) => stdout.trim().to_string(),
        Err(message) => {
            tracing::warn!(%message, "not committing: no git repository");
            return CommitOutcome::Failed(message);
        }
    };

    let path_arg = path.to_string_lossy().into_owned();
    if let Err(message) = git_in(Path::new(&root), &["add", "--", path_arg.as_str()]) {
        tracing::warn!(%message, "git add failed");
        return CommitOutcome::Failed(message);
    }

    match git_in(Path::new(&root), &["commit", "-m", description]) {
        Ok(_) => CommitOutcome::Committed,
        Err(message) => {
            tracing::warn!(%message, "git commit failed");
            CommitOutcome::Failed(message)
        }
    }
}

/// Run a git subcommand in `directory`, returning stdout on success and a
/// one-line failure description otherwise.
fn git_in(directory: &Path, args: &[&str]) -> Result<String, String> {
    let output = Command::new("git")
        .arg("-C")
        .arg(directory)
        .args(args)
        .output()
        .map_err(|e| format!("failed to run git: {e}"))?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let line = stderr.lines().next().unwrap_or("git command failed");
        Err(line.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn git_available() -> bool {
        Command::new("git").arg("--version").output().is_ok()
    }

    fn init_repo(dir: &Path) {
        for args in [
            vec!["init", "-q"],
            vec!["config", "user.email", "test@example.com"],
            vec!["config", "user.name", "Test"],
        ] {
            let status = Command::new("git")
                .arg("-C")
                .arg(dir)
                .args(&args)
                .status()
                .unwrap();
            assert!(status.success());
        }
    }

    #[test]
    fn commit_outside_repo_fails_softly() {
        if !git_available() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f.txt");
        fs::write(&file, "x").unwrap();

        // The tempdir may live under a parent repo; force non-repo behavior
        // by pointing at a path whose parent does not exist.
        let orphan = dir.path().join("no-such-dir").join("f.txt");
        let outcome = commit_changes(&orphan, "msg");
        assert!(matches!(outcome, CommitOutcome::Failed(_)));
    }

    #[test]
    fn commit_in_fresh_repo_succeeds() {
        if !git_available() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        init_repo(dir.path());

        let file = dir.path().join("f.txt");
        fs::write(&file, "content\n").unwrap();

        let outcome = commit_changes(&file, "add f.txt");
        assert_eq!(outcome, CommitOutcome::Committed);

        let log = git_in(dir.path(), &["log", "--format=%s", "-1"]).unwrap();
        assert_eq!(log.trim(), "add f.txt");
    }

    #[test]
    fn commit_note_formats() {
        assert!(CommitOutcome::Committed
            .as_note("tidy up")
            .contains("Changes committed to git: tidy up"));
        assert!(CommitOutcome::Failed("boom".into())
            .as_note("tidy up")
            .contains("Failed to commit changes to git: boom"));
    }
}
