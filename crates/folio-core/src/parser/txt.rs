//! Shell session logs (`.txt`).
//!
//! Two marker formats cut the log into blocks: a line that is exactly
//! `shell` followed by the command on the next line (possibly wrapped in
//! `[...]` style tags), and the older `$ command (timestamp)` form.
//! Content before the first marker, or a file with no markers at all,
//! becomes a single `Output` block.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::block::{Block, SourceKind};
use crate::content::ContentType;
use crate::page::{self, LINES_PER_PAGE};
use crate::parser::FormatParser;

static STYLE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[^\]]*\]").expect("Failed to compile style tag regex"));

/// Command text of a styled prompt line: `[...]` tags removed, trimmed.
fn command_text(line: &str) -> String {
    STYLE_TAG.replace_all(line, "").trim().to_string()
}

/// Block names are capped at 40 characters.
fn truncate_name(name: &str) -> String {
    if name.chars().count() > 40 {
        let head: String = name.chars().take(40).collect();
        format!("{head}...")
    } else {
        name.to_string()
    }
}

struct Pending {
    name: String,
    origin_line: usize,
    lines: Vec<String>,
}

impl Pending {
    fn into_block(self) -> Option<Block> {
        if self.lines.is_empty() {
            return None;
        }
        let content = self.lines.join("\n");
        Some(Block {
            name: self.name,
            pages: page::split_pages(&content, LINES_PER_PAGE),
            content,
            content_type: ContentType::Plain,
            page_meta: Vec::new(),
            source: SourceKind::Shell,
            origin_line: self.origin_line,
        })
    }
}

#[derive(Debug, Default)]
pub struct TxtParser;

impl FormatParser for TxtParser {
    fn name(&self) -> &'static str {
        "txt"
    }

    fn detect(&self, path: &str) -> bool {
        path.to_lowercase().ends_with(".txt")
    }

    fn parse(&self, content: &str) -> Vec<Block> {
        let lines: Vec<&str> = content.split('\n').collect();
        let mut blocks = Vec::new();
        let mut current: Option<Pending> = None;
        let mut i = 0;

        while i < lines.len() {
            let line = lines[i];
            if line.trim() == "shell" {
                if let Some(block) = current.take().and_then(Pending::into_block) {
                    blocks.push(block);
                }
                let origin_line = i + 1;
                // The command sits on the next line; it joins the block
                // body verbatim, style tags and all.
                let (name, body) = if i + 1 < lines.len() {
                    let body = vec![lines[i + 1].to_string()];
                    i += 1;
                    (command_text(lines[i]), body)
                } else {
                    (String::new(), Vec::new())
                };
                let name = if name.is_empty() {
                    "shell".to_string()
                } else {
                    name
                };
                current = Some(Pending {
                    name: truncate_name(&name),
                    origin_line,
                    lines: body,
                });
            } else if let Some(rest) = line.strip_prefix("$ ") {
                if let Some(block) = current.take().and_then(Pending::into_block) {
                    blocks.push(block);
                }
                // Old format carries a trailing "(timestamp)" to drop.
                let name = match rest.find(" (") {
                    Some(idx) if idx > 0 => &rest[..idx],
                    _ => rest,
                };
                current = Some(Pending {
                    name: truncate_name(name),
                    origin_line: i + 1,
                    lines: vec![line.to_string()],
                });
            } else if let Some(open) = current.as_mut() {
                open.lines.push(line.to_string());
            } else if !line.trim().is_empty() {
                current = Some(Pending {
                    name: "Output".to_string(),
                    origin_line: i + 1,
                    lines: vec![line.to_string()],
                });
            }
            i += 1;
        }

        if let Some(block) = current.and_then(Pending::into_block) {
            blocks.push(block);
        }
        blocks
    }
}
