//! Content classification for parsed blocks.
//!
//! Classification is a cheap, line-shape heuristic: it decides how a page
//! is rendered (diff colors, table alignment, tree dimming), never whether
//! it parses. Misclassification degrades styling, nothing else.

use once_cell::sync::Lazy;
use regex::Regex;
use strum_macros::Display;

/// Rendering category for a block or page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ContentType {
    #[default]
    Plain,
    Diff,
    Table,
    Code,
    Tree,
    Json,
    Yaml,
}

static TABLE_SEPARATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\|[\s\-:]+\|").expect("Failed to compile table separator regex")
});

static YAML_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*[A-Za-z0-9_-]+:\s+\S").expect("Failed to compile YAML key regex")
});

/// Classify text by shape. First match wins, in priority order:
/// diff, table, tree, JSON, YAML, plain. Empty input is plain.
pub fn classify(content: &str) -> ContentType {
    if is_diff(content) {
        ContentType::Diff
    } else if is_table(content) {
        ContentType::Table
    } else if is_tree(content) {
        ContentType::Tree
    } else if is_json(content) {
        ContentType::Json
    } else if is_yaml(content) {
        ContentType::Yaml
    } else {
        ContentType::Plain
    }
}

/// A diff needs a hunk header, a file header, and at least one real
/// added or removed line. All three together keep markdown bullet lists
/// and horizontal rules from landing here.
fn is_diff(content: &str) -> bool {
    if !content.contains("@@ -") {
        return false;
    }
    if !content.contains("--- ") && !content.contains("+++ ") {
        return false;
    }
    content.split('\n').any(|line| {
        (line.starts_with('+') && !line.starts_with("+++"))
            || (line.starts_with('-') && !line.starts_with("---"))
    })
}

fn is_table(content: &str) -> bool {
    let mut pipe_lines = 0;
    let mut has_separator = false;
    for line in content.split('\n') {
        let trimmed = line.trim();
        if trimmed.starts_with('|') && trimmed.ends_with('|') && trimmed.len() > 1 {
            pipe_lines += 1;
            if TABLE_SEPARATOR.is_match(trimmed) {
                has_separator = true;
            }
        }
    }
    pipe_lines >= 3 && has_separator
}

fn is_tree(content: &str) -> bool {
    let lines: Vec<&str> = content.split('\n').collect();
    if lines.len() <= 2 {
        return false;
    }
    let tree_lines = lines
        .iter()
        .filter(|line| line.contains('├') || line.contains('└') || line.contains('│'))
        .count();
    tree_lines * 2 > lines.len()
}

/// Shape check only: brace- or bracket-delimited after trimming. Blocks
/// are never validated as JSON here.
fn is_json(content: &str) -> bool {
    let trimmed = content.trim();
    (trimmed.starts_with('{') && trimmed.ends_with('}'))
        || (trimmed.starts_with('[') && trimmed.ends_with(']'))
}

fn is_yaml(content: &str) -> bool {
    let lines: Vec<&str> = content.split('\n').collect();
    if lines.len() <= 2 {
        return false;
    }
    let yaml_lines = lines
        .iter()
        .filter(|line| YAML_KEY.is_match(line) || line.trim_start().starts_with("- "))
        .count();
    yaml_lines * 2 > lines.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_plain() {
        assert_eq!(classify(""), ContentType::Plain);
    }

    #[test]
    fn test_prose_is_plain() {
        assert_eq!(classify("Just a paragraph.\nAnother line."), ContentType::Plain);
    }

    #[test]
    fn test_diff_detection() {
        let diff = "--- a/main.go\n+++ b/main.go\n@@ -1,3 +1,3 @@\n context\n-removed\n+added\n";
        assert_eq!(classify(diff), ContentType::Diff);
    }

    #[test]
    fn test_hunk_header_alone_is_not_a_diff() {
        // No file header, no +/- lines.
        assert_eq!(classify("@@ -1,2 +1,2 @@\n context"), ContentType::Plain);
    }

    #[test]
    fn test_bullet_list_is_not_a_diff() {
        // "- item" lines without hunk headers must stay plain.
        let text = "- first\n- second\n";
        assert_ne!(classify(text), ContentType::Diff);
    }

    #[test]
    fn test_table_detection() {
        let table = "| Name | Age |\n|------|-----|\n| Ada  | 36  |\n| Alan | 41  |";
        assert_eq!(classify(table), ContentType::Table);
    }

    #[test]
    fn test_table_needs_separator() {
        let no_sep = "| a | b |\n| c | d |\n| e | f |";
        assert_eq!(classify(no_sep), ContentType::Plain);
    }

    #[test]
    fn test_tree_detection() {
        let tree = "src\n├── main.rs\n├── lib.rs\n└── tests\n    └── it.rs";
        assert_eq!(classify(tree), ContentType::Tree);
    }

    #[test]
    fn test_short_tree_is_plain() {
        assert_eq!(classify("├── a\n└── b"), ContentType::Plain);
    }

    #[test]
    fn test_json_shape() {
        assert_eq!(classify("{\"key\": 1}"), ContentType::Json);
        assert_eq!(classify("  [1, 2, 3]  "), ContentType::Json);
        // Shape only: invalid JSON with the right delimiters still counts.
        assert_eq!(classify("{not actually json}"), ContentType::Json);
    }

    #[test]
    fn test_yaml_detection() {
        let yaml = "name: folio\nversion: 3\nitems:\n  - one\n  - two";
        assert_eq!(classify(yaml), ContentType::Yaml);
    }

    #[test]
    fn test_two_line_yaml_is_plain() {
        assert_eq!(classify("name: folio\nversion: 3"), ContentType::Plain);
    }

    #[test]
    fn test_diff_wins_over_yaml_shapes() {
        // Diff metadata lines can look like "key: value"; diff is checked first.
        let diff = "--- a/config.yaml\n+++ b/config.yaml\n@@ -1,2 +1,2 @@\n name: old\n-version: 1\n+version: 2\n";
        assert_eq!(classify(diff), ContentType::Diff);
    }

    #[test]
    fn test_display_is_lowercase() {
        assert_eq!(ContentType::Json.to_string(), "json");
        assert_eq!(ContentType::Plain.to_string(), "plain");
    }
}
