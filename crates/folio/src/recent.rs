//! Recent-file history backing the `pick` command and the `-` / `+`
//! shortcuts. A plain text file at `~/.folio/recent` holds absolute
//! paths, newest first, deduplicated and capped at five entries.

use eyre::Result;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

const MAX_RECENT: usize = 5;

/// Path to `~/.folio/recent`, creating the directory on first use.
fn recent_file() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| eyre::eyre!("no home directory"))?;
    let dir = home.join(".folio");
    fs::create_dir_all(&dir)?;
    Ok(dir.join("recent"))
}

/// Record a viewed file at the head of the history.
pub fn add_recent(path: &str) -> Result<()> {
    let abs = std::path::absolute(path)
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|_| path.to_string());
    let file = recent_file()?;
    push_entry(&file, &abs)?;
    Ok(())
}

fn push_entry(file: &Path, abs: &str) -> io::Result<()> {
    let existing = fs::read_to_string(file).unwrap_or_default();

    let mut entries = vec![abs.to_string()];
    for line in existing.lines() {
        if !line.is_empty() && line != abs {
            entries.push(line.to_string());
        }
    }
    entries.truncate(MAX_RECENT);

    fs::write(file, entries.join("\n") + "\n")
}

/// Recent history, newest first, optionally filtered to a set of
/// lowercase dotted extensions.
pub fn recent_files(exts: &[&str]) -> Result<Vec<String>> {
    let file = recent_file()?;
    Ok(read_entries(&file, exts)?)
}

fn read_entries(file: &Path, exts: &[&str]) -> io::Result<Vec<String>> {
    let content = fs::read_to_string(file)?;
    Ok(content
        .lines()
        .filter(|line| !line.is_empty())
        .filter(|line| exts.is_empty() || has_extension(line, exts))
        .map(str::to_string)
        .collect())
}

fn has_extension(path: &str, exts: &[&str]) -> bool {
    let ext = Path::new(path)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
        .unwrap_or_default();
    exts.contains(&ext.as_str())
}

/// Numbered stdin picker over the recent history.
pub fn pick_recent(exts: &[&str]) -> Result<String> {
    let recent = recent_files(exts).unwrap_or_default();
    if recent.is_empty() {
        eyre::bail!("no recent files");
    }

    println!("Recent files:");
    for (i, path) in recent.iter().enumerate() {
        println!("  {}. {}", i + 1, display_path(path));
    }

    print!("\n> ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    let choice: usize = input.trim().parse().unwrap_or(0);
    if choice < 1 || choice > recent.len() {
        eyre::bail!("invalid choice");
    }
    Ok(recent[choice - 1].clone())
}

/// Paths inside the current directory display relative; everything else
/// shrinks to `parent/basename`.
fn display_path(path: &str) -> String {
    if let Ok(cwd) = std::env::current_dir() {
        if let Ok(rel) = Path::new(path).strip_prefix(&cwd) {
            return rel.to_string_lossy().into_owned();
        }
    }
    let p = Path::new(path);
    match (p.parent().and_then(|d| d.file_name()), p.file_name()) {
        (Some(dir), Some(name)) => {
            format!("{}/{}", dir.to_string_lossy(), name.to_string_lossy())
        }
        (None, Some(name)) => name.to_string_lossy().into_owned(),
        _ => path.to_string(),
    }
}

/// Newest regular file in the current directory, dotfiles skipped,
/// optionally filtered by extension.
pub fn newest_in_cwd(exts: &[&str]) -> Result<String> {
    let mut files: Vec<(String, SystemTime)> = Vec::new();
    for entry in fs::read_dir(".")? {
        let entry = entry?;
        if entry.file_type().map(|t| t.is_dir()).unwrap_or(true) {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        if !exts.is_empty() && !has_extension(&name, exts) {
            continue;
        }
        let Some(modified) = entry.metadata().ok().and_then(|m| m.modified().ok()) else {
            continue;
        };
        files.push((name, modified));
    }

    if files.is_empty() {
        eyre::bail!("no matching files in current directory");
    }

    files.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(files.remove(0).0)
}
