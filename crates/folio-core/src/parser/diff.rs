//! Whole-file diff parsing: one block, one page per hunk.

use crate::block::{Block, Page, SourceKind};
use crate::content::{self, ContentType};
use crate::diff;
use crate::parser::FormatParser;

pub struct DiffParser;

impl FormatParser for DiffParser {
    fn name(&self) -> &'static str {
        "diff"
    }

    fn detect(&self, path: &str) -> bool {
        let path = path.to_lowercase();
        path.ends_with(".diff") || path.ends_with(".patch")
    }

    /// Always exactly one block. Content that fails diff classification
    /// degrades to a single plain page named "diff" (a `.diff` extension
    /// is a claim, not a guarantee); classified diffs with no parseable
    /// hunks keep one full-text diff page. Both are degradation paths,
    /// not errors.
    fn parse(&self, content: &str) -> Vec<Block> {
        if content::classify(content) != ContentType::Diff {
            return vec![Block {
                name: "diff".to_string(),
                content: content.to_string(),
                pages: vec![Page::Lines(content.to_string())],
                content_type: ContentType::Plain,
                page_meta: Vec::new(),
                source: SourceKind::Other,
                origin_line: 0,
            }];
        }
        vec![Block::from_content(
            diff::target_file(content),
            content,
            0,
            SourceKind::Other,
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_HUNKS: &str =
        "--- a/src/app.rs\n+++ b/src/app.rs\n@@ -1,3 +1,4 @@\n fn main() {\n+    init();\n     run();\n@@ -10,4 +11,3 @@\n     teardown();\n-    log();\n }\n";

    #[test]
    fn test_detect_diff_extensions() {
        assert!(DiffParser.detect("change.diff"));
        assert!(DiffParser.detect("FIX.PATCH"));
        assert!(!DiffParser.detect("readme.md"));
    }

    #[test]
    fn test_round_trip_one_block_page_per_hunk() {
        let blocks = DiffParser.parse(TWO_HUNKS);
        assert_eq!(blocks.len(), 1);
        let block = &blocks[0];
        assert_eq!(block.name, "src/app.rs");
        assert_eq!(block.page_count(), 2);
        assert_eq!(block.content_type, ContentType::Diff);
        for i in 0..block.page_count() {
            assert_eq!(block.page_content_type(i), ContentType::Diff);
        }
    }

    #[test]
    fn test_non_diff_content_degrades_to_plain_block() {
        let blocks = DiffParser.parse("not a diff at all\njust lines\n");
        assert_eq!(blocks.len(), 1);
        let block = &blocks[0];
        assert_eq!(block.name, "diff");
        assert_eq!(block.content_type, ContentType::Plain);
        assert_eq!(block.page_count(), 1);
        // The full content lands on the single fallback page.
        assert_eq!(block.pages[0].text(), "not a diff at all\njust lines\n");
    }

    #[test]
    fn test_missing_target_header_names_file() {
        let diff = "--- a/only_old.txt\n@@ -1 +1 @@\n-x\n+y\n";
        let blocks = DiffParser.parse(diff);
        assert_eq!(blocks[0].name, "file");
    }

    #[test]
    fn test_parse_is_idempotent() {
        assert_eq!(DiffParser.parse(TWO_HUNKS), DiffParser.parse(TWO_HUNKS));
    }
}
