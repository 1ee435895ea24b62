//! Page rendering for blocks.
//!
//! One page becomes one run of lines: a leading blank, a header styled
//! for the block's source kind, the page body, and a trailing blank.
//! Diff hunk pages delegate to the diff renderer; conversation pages are
//! restyled line by line; everything else renders as markdown.

use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

use folio_core::block::{Block, Page, SourceKind};

use crate::tui::theme::{Component, Theme};
use crate::tui::widgets::{diff, markdown};

/// Per-render settings, passed explicitly instead of living in process
/// globals.
#[derive(Debug, Clone, Copy)]
pub struct RenderConfig {
    pub width: u16,
    pub show_line_numbers: bool,
}

impl RenderConfig {
    pub fn new(width: u16) -> Self {
        Self {
            width,
            show_line_numbers: false,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::new(80)
    }
}

/// Render one page of a block into displayable lines.
pub fn render_page(
    block: &Block,
    page: usize,
    cfg: &RenderConfig,
    theme: &Theme,
) -> Vec<Line<'static>> {
    if block.pages.is_empty() {
        return vec![Line::default()];
    }
    let page = if page < block.pages.len() { page } else { 0 };

    let mut out = vec![Line::default()];
    match &block.pages[page] {
        Page::Hunk { diff: content, hunk } => {
            out.extend(diff::render_hunk_page(
                block, page, content, *hunk, cfg.width, theme,
            ));
        }
        Page::Lines(content) => {
            out.push(header_line(block, page, cfg.width, theme));

            // One column is reserved for the left margin.
            let body_width = cfg.width.saturating_sub(1);
            let body = match block.source {
                SourceKind::Chat => restyle_chat_lines(content, body_width, theme),
                _ => markdown::render_markdown(content, body_width, theme),
            };

            let gutter_start = if cfg.show_line_numbers && block.source != SourceKind::Chat {
                Some(page_start_line(block, page)).filter(|start| *start > 0)
            } else {
                None
            };

            for (idx, line) in body.into_iter().enumerate() {
                if let Some(start) = gutter_start {
                    let number = Span::styled(
                        format!("{:>4} ", start + idx),
                        theme.style(Component::DimText),
                    );
                    let mut spans = vec![number];
                    spans.extend(line.spans);
                    out.push(Line::from(spans));
                } else if line.spans.is_empty() {
                    out.push(line);
                } else {
                    let mut spans = vec![Span::raw(" ")];
                    spans.extend(line.spans);
                    out.push(Line::from(spans));
                }
            }
            out.push(Line::default());
        }
    }
    out
}

/// First source line of a page: the block's origin plus the raw line
/// counts of the pages before it.
fn page_start_line(block: &Block, page: usize) -> usize {
    let mut start = block.origin_line;
    for earlier in block.pages.iter().take(page) {
        if let Page::Lines(text) = earlier {
            start += text.split('\n').count();
        }
    }
    start
}

/// Header line for a page. Markdown sources get a full-width background
/// bar; conversation blocks show `chat N`, shell blocks `shell`; the page
/// indicator is right-aligned when there is more than one page.
fn header_line(block: &Block, page: usize, width: u16, theme: &Theme) -> Line<'static> {
    let display_name = match block.page_meta.get(page) {
        Some(meta) if !meta.is_empty() => meta.clone(),
        _ => block.name.clone(),
    };
    let total = block.pages.len();
    let indicator = (total > 1).then(|| format!("[{}/{}]", page + 1, total));
    let width = width as usize;

    if block.source == SourceKind::Markdown {
        let mut header = match &indicator {
            Some(indicator) => {
                let spacing = width
                    .saturating_sub(display_name.width())
                    .saturating_sub(indicator.width())
                    .saturating_sub(4)
                    .max(1);
                format!(" {}{}{} ", display_name, " ".repeat(spacing), indicator)
            }
            None => format!(" {display_name} "),
        };
        let used = header.width();
        if used < width {
            header.push_str(&" ".repeat(width - used));
        }
        return Line::from(Span::styled(header, theme.style(Component::BlockHeader)));
    }

    // Visible-name spans per source kind.
    let mut spans = vec![Span::raw(" ")];
    let name_width = match block.source {
        SourceKind::Chat if display_name.starts_with("block-") => {
            let number = display_name.trim_start_matches("block-").to_string();
            spans.push(Span::styled(
                "chat".to_string(),
                theme.style(Component::ChatLabel),
            ));
            spans.push(Span::raw(" "));
            let w = "chat ".width() + number.width();
            spans.push(Span::styled(number, theme.style(Component::DimText)));
            w
        }
        SourceKind::Shell => {
            spans.push(Span::styled(
                "shell".to_string(),
                theme.style(Component::ShellLabel),
            ));
            "shell".width()
        }
        _ => {
            let w = display_name.width();
            spans.push(Span::raw(display_name));
            w
        }
    };

    if let Some(indicator) = indicator {
        let spacing = width
            .saturating_sub(name_width)
            .saturating_sub(indicator.width())
            .saturating_sub(4)
            .max(1);
        spans.push(Span::raw(" ".repeat(spacing)));
        spans.push(Span::raw(indicator));
    }
    Line::from(spans)
}

/// Style conversation content by line shape: `❯ ` user lines, `--- x ---`
/// diff sections with their add/remove bodies, tool summaries, `[?]`
/// questions. Everything else is assistant prose.
fn restyle_chat_lines(content: &str, width: u16, theme: &Theme) -> Vec<Line<'static>> {
    const TOOL_NAMES: [&str; 5] = ["Bash:", "Read:", "Glob:", "Grep:", "Edit:"];

    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut in_diff_run = false;

    for raw in content.split('\n') {
        if raw.is_empty() {
            in_diff_run = false;
            lines.push(Line::default());
            continue;
        }

        let line = if raw.starts_with("\u{276f} ") {
            Line::from(Span::styled(
                raw.to_string(),
                theme.style(Component::UserText),
            ))
        } else if raw.starts_with("--- ") && raw.ends_with(" ---") {
            in_diff_run = true;
            Line::from(Span::styled(
                raw.to_string(),
                theme.style(Component::DimText),
            ))
        } else if in_diff_run && raw.starts_with('+') {
            Line::from(Span::styled(
                raw.to_string(),
                theme.style(Component::DiffAdded),
            ))
        } else if in_diff_run && raw.starts_with('-') {
            Line::from(Span::styled(
                raw.to_string(),
                theme.style(Component::DiffRemoved),
            ))
        } else if in_diff_run && raw.starts_with("@@") {
            Line::from(Span::styled(
                raw.to_string(),
                theme.style(Component::DimText),
            ))
        } else if let Some(rest) = raw.strip_prefix("[?]") {
            Line::from(vec![
                Span::styled("[?]".to_string(), theme.style(Component::Question)),
                Span::raw(rest.to_string()),
            ])
        } else if raw.starts_with("(multi-select") {
            Line::from(Span::styled(
                raw.to_string(),
                theme.style(Component::DimText),
            ))
        } else if let Some((marker, rest)) = split_option_marker(raw) {
            Line::from(vec![
                Span::styled(marker, theme.style(Component::ListBullet)),
                Span::raw(rest),
            ])
        } else if let Some(name) = TOOL_NAMES.iter().find(|n| raw.starts_with(*n)) {
            Line::from(vec![
                Span::styled(name.to_string(), theme.style(Component::ToolSummary)),
                Span::raw(raw[name.len()..].to_string()),
            ])
        } else {
            Line::from(Span::styled(
                raw.to_string(),
                theme.style(Component::AssistantText),
            ))
        };

        let width = width as usize;
        if line.width() > width {
            lines.extend(markdown::wrap_styled_line(line, width, 0));
        } else {
            lines.push(line);
        }
    }
    lines
}

/// `  N. label` question option lines: returns the `  N.` marker and the
/// remainder.
fn split_option_marker(raw: &str) -> Option<(String, String)> {
    let rest = raw.strip_prefix("  ")?;
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    let after = &rest[digits.len()..];
    if !after.starts_with(". ") {
        return None;
    }
    let marker = format!("  {digits}.");
    Some((marker, after[1..].to_string()))
}
