use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use similar::{ChangeTag, TextDiff};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use agentedit::{codec, edit_file, matcher, patch, EditRequest, LineEnding};

#[derive(Parser)]
#[command(name = "agentedit")]
#[command(about = "Agent-facing file editing with unique-match replacement", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace a unique snippet in a file
    Edit {
        /// File to edit
        file: PathBuf,

        /// Old text, inline
        #[arg(long, conflicts_with = "old_file")]
        old: Option<String>,

        /// Read old text from a file
        #[arg(long)]
        old_file: Option<PathBuf>,

        /// New text, inline
        #[arg(long, conflicts_with = "new_file")]
        new: Option<String>,

        /// Read new text from a file
        #[arg(long)]
        new_file: Option<PathBuf>,

        /// Commit message describing the change
        #[arg(short, long, default_value = "")]
        message: String,

        /// Show the diff without modifying the file
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// With --dry-run, print the hunk as JSON instead of a diff
        #[arg(long, requires = "dry_run")]
        json: bool,
    },

    /// Create a new file (fails if it already exists)
    Create {
        /// File to create
        file: PathBuf,

        /// Content, inline
        #[arg(long, conflicts_with = "content_file")]
        content: Option<String>,

        /// Read content from a file
        #[arg(long)]
        content_file: Option<PathBuf>,

        /// Commit message describing the change
        #[arg(short, long, default_value = "")]
        message: String,
    },

    /// Apply an edit request from a JSON file
    Apply {
        /// JSON file holding { path, old_text, new_text, description }
        request: PathBuf,

        /// Show the diff without modifying the file
        #[arg(short = 'n', long)]
        dry_run: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Edit {
            file,
            old,
            old_file,
            new,
            new_file,
            message,
            dry_run,
            json,
        } => {
            let old = read_text_arg(old, old_file, "--old or --old-file")?;
            let new = read_text_arg(new, new_file, "--new or --new-file")?;
            if dry_run {
                preview(&file, &old, &new, json)
            } else {
                println!("{}", edit_file(&file, &old, &new, None, &message));
                Ok(())
            }
        }

        Commands::Create {
            file,
            content,
            content_file,
            message,
        } => {
            let content = read_text_arg(content, content_file, "--content or --content-file")?;
            println!("{}", edit_file(&file, "", &content, None, &message));
            Ok(())
        }

        Commands::Apply { request, dry_run } => {
            let raw = fs::read_to_string(&request)?;
            let req: EditRequest = serde_json::from_str(&raw)?;
            if dry_run {
                preview(&req.path, &req.old_text, &req.new_text, false)
            } else {
                println!(
                    "{}",
                    edit_file(
                        &req.path,
                        &req.old_text,
                        &req.new_text,
                        None,
                        &req.description
                    )
                );
                Ok(())
            }
        }
    }
}

/// Helper: resolve a text argument given either inline or via a file.
fn read_text_arg(inline: Option<String>, path: Option<PathBuf>, flag: &str) -> Result<String> {
    match (inline, path) {
        (Some(text), _) => Ok(text),
        (None, Some(path)) => Ok(fs::read_to_string(path)?),
        (None, None) => anyhow::bail!("Missing required argument: {flag}"),
    }
}

/// Dry run: locate the match, print the hunk header and a colored diff, and
/// leave the file untouched.
fn preview(file: &Path, old: &str, new: &str, json: bool) -> Result<()> {
    let raw = fs::read(file)?;
    let encoding = codec::sniff_encoding(&raw);
    let content =
        codec::normalize_line_endings(&codec::decode(&raw, encoding), LineEnding::Lf);

    let m = matcher::find_unique(&content, old)
        .map_err(|e| anyhow::anyhow!("{}: {e}", file.display()))?;
    let hunk = patch::build_hunk(&m, new);
    let updated = content.replacen(&m.text, new, 1);

    if json {
        println!("{}", serde_json::to_string_pretty(&hunk)?);
        return Ok(());
    }

    println!(
        "{}",
        format!("Would edit {} at line {}", file.display(), hunk.old_start).bold()
    );
    display_diff(file, &content, &updated);
    Ok(())
}

/// Helper: Show unified diff between original and modified content
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (edited)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
}
