//! The block/page model every parser produces and every renderer consumes.
//!
//! A [`Block`] is a named, navigable unit of content (a markdown section, a
//! conversation turn, a shell command's output). Blocks are split into
//! [`Page`]s up front so navigation is O(1): either fixed windows of lines
//! or, for diffs, one page per hunk.

use std::sync::Arc;

use strum_macros::{Display, EnumString};

use crate::content::{self, ContentType};
use crate::page;

/// Where a block came from, which drives how it is framed on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum SourceKind {
    Markdown,
    Chat,
    Shell,
    #[default]
    Other,
}

/// One screenful of a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    /// A fixed window of source lines, stored verbatim.
    Lines(String),
    /// One hunk of a unified diff. The page keeps the whole diff so a
    /// renderer has the file headers and surrounding hunks available;
    /// `hunk` selects the region this page shows.
    Hunk { diff: Arc<str>, hunk: usize },
}

impl Page {
    /// Raw text behind the page. For hunk pages this is the entire diff,
    /// not just the selected hunk.
    pub fn text(&self) -> &str {
        match self {
            Page::Lines(s) => s,
            Page::Hunk { diff, .. } => diff,
        }
    }

    pub fn hunk_index(&self) -> Option<usize> {
        match self {
            Page::Lines(_) => None,
            Page::Hunk { hunk, .. } => Some(*hunk),
        }
    }

    pub fn is_diff(&self) -> bool {
        matches!(self, Page::Hunk { .. })
    }
}

/// A named, paginated unit of parsed content.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// Display name and jump target (heading text, `block-N`, command name).
    pub name: String,
    /// Full unpaginated text of the block.
    pub content: String,
    /// Never empty: blocks with no content carry one empty `Lines` page.
    pub pages: Vec<Page>,
    /// Classified type of the block as a whole; `Lines` pages inherit it.
    pub content_type: ContentType,
    /// Per-page labels (markdown breadcrumb, diff file name). Either empty
    /// or one entry per page.
    pub page_meta: Vec<String>,
    pub source: SourceKind,
    /// 1-based source line the block starts at; 0 when unknown.
    pub origin_line: usize,
}

impl Block {
    /// Classify `content` and paginate it: hunk-aligned pages when it looks
    /// like a diff, fixed windows of [`page::LINES_PER_PAGE`] lines otherwise.
    pub fn from_content(
        name: impl Into<String>,
        content: impl Into<String>,
        origin_line: usize,
        source: SourceKind,
    ) -> Self {
        let content = content.into();
        let content_type = content::classify(&content);
        let pages = if content_type == ContentType::Diff {
            page::hunk_pages(&content)
        } else {
            page::split_pages(&content, page::LINES_PER_PAGE)
        };
        Block {
            name: name.into(),
            content,
            pages,
            content_type,
            page_meta: Vec::new(),
            source,
            origin_line,
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Effective content type of one page: hunk pages are always diffs,
    /// line pages inherit the block's type. Out-of-range indices fall back
    /// to the block's type.
    pub fn page_content_type(&self, index: usize) -> ContentType {
        match self.pages.get(index) {
            Some(Page::Hunk { .. }) => ContentType::Diff,
            _ => self.content_type,
        }
    }

    /// Label for one page (breadcrumb trail, diff file name), if any.
    pub fn page_label(&self, index: usize) -> Option<&str> {
        self.page_meta
            .get(index)
            .map(String::as_str)
            .filter(|m| !m.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_content_still_has_a_page() {
        let block = Block::from_content("empty", "", 0, SourceKind::Other);
        assert_eq!(block.page_count(), 1);
        assert_eq!(block.pages[0], Page::Lines(String::new()));
    }

    #[test]
    fn test_diff_content_gets_hunk_pages() {
        let diff = "--- a/x.txt\n+++ b/x.txt\n@@ -1,2 +1,2 @@\n context\n-old\n+new\n";
        let block = Block::from_content("x", diff, 0, SourceKind::Other);
        assert_eq!(block.content_type, ContentType::Diff);
        assert_eq!(block.page_count(), 1);
        assert!(block.pages[0].is_diff());
        assert_eq!(block.page_content_type(0), ContentType::Diff);
        // Hunk pages keep the whole diff text.
        assert_eq!(block.pages[0].text(), diff);
    }

    #[test]
    fn test_page_content_type_inherits_block_type() {
        let block = Block::from_content("plain", "hello\nworld", 3, SourceKind::Shell);
        assert_eq!(block.page_content_type(0), ContentType::Plain);
        // Out of range falls back to the block default.
        assert_eq!(block.page_content_type(99), ContentType::Plain);
    }

    #[test]
    fn test_page_label_skips_empty_entries() {
        let mut block = Block::from_content("doc", "text", 0, SourceKind::Markdown);
        block.page_meta = vec![String::new()];
        assert_eq!(block.page_label(0), None);
        block.page_meta = vec!["Intro > Setup".to_string()];
        assert_eq!(block.page_label(0), Some("Intro > Setup"));
        assert_eq!(block.page_label(7), None);
    }

    #[test]
    fn test_source_kind_display_is_lowercase() {
        assert_eq!(SourceKind::Markdown.to_string(), "markdown");
        assert_eq!(SourceKind::Chat.to_string(), "chat");
    }
}
