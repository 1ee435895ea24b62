//! Pagination: fixed line windows for ordinary content, hunk-aligned pages
//! for diffs.

use std::sync::Arc;

use crate::block::Page;
use crate::diff;

/// Default window height for line-based pages.
pub const LINES_PER_PAGE: usize = 50;

/// Split content into fixed windows of `page_size` lines. Empty content
/// still yields one (empty) page so every block stays navigable; a page
/// size of zero is clamped to one line.
pub fn split_pages(content: &str, page_size: usize) -> Vec<Page> {
    let lines: Vec<&str> = content.split('\n').collect();
    lines
        .chunks(page_size.max(1))
        .map(|chunk| Page::Lines(chunk.join("\n")))
        .collect()
}

/// One page per hunk, every page sharing the whole diff text. When no
/// hunks parse out of text already classified as a diff, the entire text
/// becomes a single page rather than being windowed mid-hunk.
pub fn hunk_pages(diff: &str) -> Vec<Page> {
    let hunks = diff::parse_hunks(diff);
    if hunks.is_empty() {
        return vec![Page::Lines(diff.to_string())];
    }
    let shared: Arc<str> = Arc::from(diff);
    (0..hunks.len())
        .map(|i| Page::Hunk {
            diff: Arc::clone(&shared),
            hunk: i,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered_lines(n: usize) -> String {
        (1..=n).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n")
    }

    #[test]
    fn test_windows_cover_every_line_in_order() {
        let content = numbered_lines(120);
        let pages = split_pages(&content, 50);
        assert_eq!(pages.len(), 3);
        let rejoined = pages
            .iter()
            .map(Page::text)
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(rejoined, content);
    }

    #[test]
    fn test_exact_multiple_of_page_size() {
        let pages = split_pages(&numbered_lines(100), 50);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].text().split('\n').count(), 50);
    }

    #[test]
    fn test_empty_content_yields_one_empty_page() {
        let pages = split_pages("", 50);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].text(), "");
    }

    #[test]
    fn test_zero_page_size_is_clamped() {
        let pages = split_pages("a\nb\nc", 0);
        assert_eq!(pages.len(), 3);
    }

    #[test]
    fn test_hunk_pages_one_per_hunk() {
        let diff = "--- a/f\n+++ b/f\n@@ -1,2 +1,2 @@\n-x\n+y\n@@ -9,2 +9,2 @@\n-p\n+q\n";
        let pages = hunk_pages(diff);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].hunk_index(), Some(0));
        assert_eq!(pages[1].hunk_index(), Some(1));
        // Every hunk page carries the full diff.
        assert_eq!(pages[0].text(), diff);
        assert_eq!(pages[1].text(), diff);
    }

    #[test]
    fn test_unparseable_diff_becomes_single_page() {
        // Contains "@@ -" mid-line so classification can fire without any
        // line-initial hunk header for the parser to anchor on.
        let text = "note: @@ -1,2 +1,2 @@ inline\nmore text";
        let pages = hunk_pages(text);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].text(), text);
        assert!(!pages[0].is_diff());
    }
}
