//! Markdown parsing: heading-cut blocks, or a single continuously-paged
//! block with breadcrumbs for full-document reading.

use crate::block::{Block, Page, SourceKind};
use crate::content::ContentType;
use crate::page;
use crate::parser::FormatParser;

pub struct MarkdownParser;

fn h1_text(line: &str) -> Option<&str> {
    line.strip_prefix("# ")
}

fn h2_text(line: &str) -> Option<&str> {
    line.strip_prefix("## ")
}

fn section_block(name: String, body: &[&str], origin_line: usize) -> Block {
    let mut body = body;
    while body.last() == Some(&"") {
        body = &body[..body.len() - 1];
    }
    Block::from_content(name, body.join("\n"), origin_line, SourceKind::Markdown)
}

impl MarkdownParser {
    /// Continuous flow mode: no heading cuts, one block, pages sized to
    /// the terminal (`height - 4`, clamped to 10..=50 lines). Each page
    /// carries a breadcrumb of the h1/h2 context active at its first
    /// line; the block is named after the first page's breadcrumb.
    pub fn parse_continuous(&self, content: &str, term_height: usize) -> Vec<Block> {
        let page_size = term_height.saturating_sub(4).clamp(10, page::LINES_PER_PAGE);

        let mut lines: Vec<&str> = content.split('\n').collect();
        while lines.last() == Some(&"") {
            lines.pop();
        }
        if lines.is_empty() {
            return vec![Block {
                name: "Document".to_string(),
                content: String::new(),
                pages: vec![Page::Lines(String::new())],
                content_type: ContentType::Plain,
                page_meta: Vec::new(),
                source: SourceKind::Markdown,
                origin_line: 0,
            }];
        }

        // One pass to know the active headings at every line; a heading
        // line counts for the page it opens.
        let mut states: Vec<(&str, &str)> = Vec::with_capacity(lines.len());
        let mut h1 = "";
        let mut h2 = "";
        for line in &lines {
            if let Some(text) = h1_text(line) {
                h1 = text.trim();
                h2 = "";
            } else if let Some(text) = h2_text(line) {
                h2 = text.trim();
            }
            states.push((h1, h2));
        }

        let mut pages = Vec::new();
        let mut page_meta = Vec::new();
        for (chunk_index, chunk) in lines.chunks(page_size).enumerate() {
            pages.push(Page::Lines(chunk.join("\n")));
            let (h1, h2) = states
                .get(chunk_index * page_size)
                .copied()
                .unwrap_or_default();
            let crumb = match (h1.is_empty(), h2.is_empty()) {
                (false, false) => format!("{h1} > {h2}"),
                (false, true) => h1.to_string(),
                (true, false) => h2.to_string(),
                (true, true) => "Document".to_string(),
            };
            page_meta.push(crumb);
        }

        let name = page_meta
            .first()
            .cloned()
            .unwrap_or_else(|| "Document".to_string());
        vec![Block {
            name,
            content: content.to_string(),
            pages,
            content_type: ContentType::Plain,
            page_meta,
            source: SourceKind::Markdown,
            origin_line: 0,
        }]
    }
}

impl FormatParser for MarkdownParser {
    fn name(&self) -> &'static str {
        "markdown"
    }

    fn detect(&self, path: &str) -> bool {
        let path = path.to_lowercase();
        path.ends_with(".md") || path.ends_with(".markdown")
    }

    /// Heading-cut mode: every `# ` or `## ` line (never deeper) starts a
    /// block named after the heading. Content before the first heading is
    /// dropped, so a headingless document parses to zero blocks; callers
    /// wanting whole-document rendering use [`Self::parse_continuous`]
    /// instead.
    fn parse(&self, content: &str) -> Vec<Block> {
        let mut blocks = Vec::new();
        let mut current: Option<(String, Vec<&str>, usize)> = None;

        for (i, line) in content.split('\n').enumerate() {
            let heading = h1_text(line).or_else(|| h2_text(line));
            if let Some(text) = heading {
                if let Some((name, body, origin)) = current.take() {
                    blocks.push(section_block(name, &body, origin));
                }
                let name = text.trim();
                // A heading with no text closes the previous section but
                // opens nothing; its body is dropped like a preamble.
                current = (!name.is_empty()).then(|| (name.to_string(), Vec::new(), i + 1));
            } else if let Some((_, body, _)) = current.as_mut() {
                body.push(line);
            }
        }
        if let Some((name, body, origin)) = current {
            blocks.push(section_block(name, &body, origin));
        }
        blocks
    }
}
