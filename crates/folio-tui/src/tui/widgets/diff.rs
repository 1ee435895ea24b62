//! Rendering for diff hunk pages.
//!
//! Added and removed lines get solid full-width backgrounds; context
//! stays gray and unpadded. A footer names the functions a hunk touches
//! when its lines contain recognizable definitions.

use once_cell::sync::Lazy;
use ratatui::text::{Line, Span};
use regex::Regex;
use std::collections::HashSet;
use unicode_width::UnicodeWidthStr;

use folio_core::block::Block;
use folio_core::diff::{DiffHunk, DiffLineKind, parse_hunks, target_file};

use crate::tui::theme::{Component, Theme};

static GO_FUNC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"func\s+([a-zA-Z0-9_]+)\s*\(").expect("Failed to compile Go function regex")
});
static PY_FUNC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:def|class)\s+([a-zA-Z0-9_]+)").expect("Failed to compile Python def regex")
});
static JS_FUNC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:function\s+([a-zA-Z0-9_]+)|([a-zA-Z0-9_]+)\s*=\s*\(|class\s+([a-zA-Z0-9_]+))")
        .expect("Failed to compile JS function regex")
});

/// Render one hunk page: header with filename and page indicator, a blank
/// separator, then the hunk body.
pub fn render_hunk_page(
    block: &Block,
    page: usize,
    diff: &str,
    hunk_index: usize,
    width: u16,
    theme: &Theme,
) -> Vec<Line<'static>> {
    let hunks = parse_hunks(diff);
    if hunks.is_empty() {
        // Not a parseable diff; show it as-is.
        return diff.split('\n').map(|l| Line::from(l.to_string())).collect();
    }
    let hunk = &hunks[hunk_index.min(hunks.len() - 1)];

    let filename = match block.page_meta.get(page) {
        Some(meta) if !meta.is_empty() => meta.clone(),
        _ => target_file(diff),
    };
    let basename = filename.rsplit('/').next().unwrap_or(&filename).to_string();

    let mut lines = vec![header_line(block, page, &basename, width, theme)];
    lines.push(Line::default());
    lines.extend(hunk_body(hunk, width, theme));
    lines
}

/// ` name  filename … [page/total]` with the indicator pushed to the right
/// edge.
fn header_line(
    block: &Block,
    page: usize,
    basename: &str,
    width: u16,
    theme: &Theme,
) -> Line<'static> {
    let indicator = format!("[{}/{}]", page + 1, block.pages.len());
    let spacing = (width as usize)
        .saturating_sub(block.name.width())
        .saturating_sub(basename.width())
        .saturating_sub(indicator.width())
        .saturating_sub(8)
        .max(1);
    Line::from(vec![
        Span::raw(format!(" {}  ", block.name)),
        Span::styled(basename.to_string(), theme.style(Component::DiffFile)),
        Span::raw(" ".repeat(spacing)),
        Span::raw(indicator),
    ])
}

/// The hunk's lines, four columns of indent, plus the affects footer.
fn hunk_body(hunk: &DiffHunk, width: u16, theme: &Theme) -> Vec<Line<'static>> {
    // Padding width for the solid background blocks.
    let content_width = (width as usize).saturating_sub(4).max(40);

    let mut lines = Vec::with_capacity(hunk.lines.len() + 2);
    for line in &hunk.lines {
        let rendered = match line.kind {
            DiffLineKind::Added => Line::from(vec![
                Span::raw("    "),
                Span::styled(
                    pad_to(&line.content, content_width),
                    theme.style(Component::DiffAdded),
                ),
            ]),
            DiffLineKind::Removed => Line::from(vec![
                Span::raw("    "),
                Span::styled(
                    pad_to(&line.content, content_width),
                    theme.style(Component::DiffRemoved),
                ),
            ]),
            DiffLineKind::Context => Line::from(vec![
                Span::raw("    "),
                Span::styled(line.content.clone(), theme.style(Component::DiffContext)),
            ]),
        };
        lines.push(rendered);
    }

    if let Some(affects) = detect_functions(hunk) {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            format!("  {affects}"),
            theme.style(Component::DimText),
        )));
    }
    lines
}

fn pad_to(content: &str, width: usize) -> String {
    let padding = width.saturating_sub(content.width());
    format!("{}{}", content, " ".repeat(padding))
}

/// Scan hunk lines for Go, Python and JavaScript definitions; names are
/// reported once, in order of first appearance.
fn detect_functions(hunk: &DiffHunk) -> Option<String> {
    fn push_unique(name: &str, functions: &mut Vec<String>, seen: &mut HashSet<String>) {
        let name = format!("{name}()");
        if seen.insert(name.clone()) {
            functions.push(name);
        }
    }

    let mut functions: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for line in &hunk.lines {
        let content = &line.content;
        if let Some(captures) = GO_FUNC.captures(content) {
            if let Some(name) = captures.get(1) {
                push_unique(name.as_str(), &mut functions, &mut seen);
            }
        }
        if let Some(captures) = PY_FUNC.captures(content) {
            if let Some(name) = captures.get(1) {
                push_unique(name.as_str(), &mut functions, &mut seen);
            }
        }
        if let Some(captures) = JS_FUNC.captures(content) {
            for idx in 1..=3 {
                if let Some(name) = captures.get(idx) {
                    if !name.as_str().is_empty() {
                        push_unique(name.as_str(), &mut functions, &mut seen);
                        break;
                    }
                }
            }
        }
    }

    if functions.is_empty() {
        None
    } else {
        Some(format!("affects: {}", functions.join(" ")))
    }
}
