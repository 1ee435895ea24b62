//! Unified-diff hunk parsing.
//!
//! Splits a diff into hunks so each hunk can become its own page. Parsing
//! only: diffs arrive pre-computed (from files or transcript patches) and
//! are never recomputed here.

use once_cell::sync::Lazy;
use regex::Regex;

/// Anchors are optional-count tolerant: `@@ -12 +12 @@` parses too.
static HUNK_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"@@ -(\d+),?\d* \+(\d+),?\d* @@").expect("Failed to compile hunk header regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffLineKind {
    Context,
    Added,
    Removed,
}

/// One line of a hunk body, marker stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub kind: DiffLineKind,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiffHunk {
    /// The `@@` line, verbatim (keeps any trailing section heading).
    pub header: String,
    pub lines: Vec<DiffLine>,
    /// 1-based start line in the old file; 0 if the header did not parse.
    pub old_start: usize,
    /// 1-based start line in the new file; 0 if the header did not parse.
    pub new_start: usize,
}

impl DiffHunk {
    pub fn added_count(&self) -> usize {
        self.lines
            .iter()
            .filter(|l| l.kind == DiffLineKind::Added)
            .count()
    }

    pub fn removed_count(&self) -> usize {
        self.lines
            .iter()
            .filter(|l| l.kind == DiffLineKind::Removed)
            .count()
    }
}

/// Parse a unified diff into hunks. File header lines (`--- `/`+++ `) are
/// skipped, everything before the first `@@` is ignored, and text with no
/// hunk headers yields an empty vec. Added and removed lines lose their
/// marker; context lines lose one leading space when present; anything
/// else inside a hunk (including empty lines) is context verbatim.
pub fn parse_hunks(content: &str) -> Vec<DiffHunk> {
    let mut hunks = Vec::new();
    let mut current: Option<DiffHunk> = None;

    for line in content.split('\n') {
        if line.starts_with("--- ") || line.starts_with("+++ ") {
            continue;
        }
        if line.starts_with("@@") {
            if let Some(hunk) = current.take() {
                hunks.push(hunk);
            }
            let mut hunk = DiffHunk {
                header: line.to_string(),
                ..Default::default()
            };
            if let Some(caps) = HUNK_HEADER.captures(line) {
                hunk.old_start = caps[1].parse().unwrap_or(0);
                hunk.new_start = caps[2].parse().unwrap_or(0);
            }
            current = Some(hunk);
            continue;
        }
        let Some(hunk) = current.as_mut() else {
            continue;
        };
        let diff_line = if let Some(rest) = line.strip_prefix('+') {
            DiffLine {
                kind: DiffLineKind::Added,
                content: rest.to_string(),
            }
        } else if let Some(rest) = line.strip_prefix('-') {
            DiffLine {
                kind: DiffLineKind::Removed,
                content: rest.to_string(),
            }
        } else {
            DiffLine {
                kind: DiffLineKind::Context,
                content: line.strip_prefix(' ').unwrap_or(line).to_string(),
            }
        };
        hunk.lines.push(diff_line);
    }

    if let Some(hunk) = current {
        hunks.push(hunk);
    }
    hunks
}

/// File a diff touches, from its first `+++ ` header: the `b/` prefix and
/// any tab-delimited metadata are dropped. Falls back to `"file"`.
pub fn target_file(diff: &str) -> String {
    for line in diff.split('\n') {
        if let Some(rest) = line.strip_prefix("+++ ") {
            let mut name = rest.strip_prefix("b/").unwrap_or(rest);
            if let Some(tab) = name.find('\t') {
                name = &name[..tab];
            }
            return name.to_string();
        }
    }
    "file".to_string()
}
