//! Format parsers and their dispatch.
//!
//! Every format implements the same two-method capability: claim a path,
//! turn content into blocks. Dispatch walks a fixed priority order and the
//! markdown parser doubles as the universal fallback for unknown
//! extensions. Piped input with no path goes through content sniffing
//! instead.

mod diff;
mod jsonl;
mod markdown;
mod todo;
mod txt;

pub use diff::DiffParser;
pub use jsonl::{
    format_question, format_question_indexed, parse_line, scan_categories, Category,
    CategoryCount, JsonlParser, ParsedLine, QuestionData, QuestionOption, TranscriptFilters,
    Turn, TurnPart,
};
pub use markdown::MarkdownParser;
pub use todo::TodoParser;
pub use txt::TxtParser;

use once_cell::sync::Lazy;

use crate::block::Block;
use crate::content::{self, ContentType};

/// The capability every format parser implements. Parsing never fails:
/// unusable content yields fewer (possibly zero) blocks, not errors.
pub trait FormatParser: Send + Sync {
    /// Stable identifier, also used to force a format from the CLI.
    fn name(&self) -> &'static str;
    /// Whether this parser claims the given path (extension check).
    fn detect(&self, path: &str) -> bool;
    fn parse(&self, content: &str) -> Vec<Block>;
}

static TODO: TodoParser = TodoParser;
static DIFF: DiffParser = DiffParser;
static MARKDOWN: MarkdownParser = MarkdownParser;
static TXT: TxtParser = TxtParser;
static JSONL: Lazy<JsonlParser> = Lazy::new(JsonlParser::default);

/// Priority order: todo first (a `.json` task list is more specific than
/// any text format), then diff, markdown, transcript, plain text.
static REGISTRY: Lazy<[&'static dyn FormatParser; 5]> =
    Lazy::new(|| [&TODO, &DIFF, &MARKDOWN, &*JSONL, &TXT]);

pub fn registry() -> &'static [&'static dyn FormatParser] {
    &*REGISTRY
}

/// First parser claiming the path; markdown when none does.
pub fn parser_for_path(path: &str) -> &'static dyn FormatParser {
    for parser in registry() {
        if parser.detect(path) {
            return *parser;
        }
    }
    &MARKDOWN
}

/// Look a parser up by its [`FormatParser::name`].
pub fn parser_named(name: &str) -> Option<&'static dyn FormatParser> {
    registry().iter().copied().find(|p| p.name() == name)
}

/// Sniff piped content with no usable path: a first line that parses as a
/// JSON object means a transcript, content shaped like a diff means a
/// diff, anything else is treated as markdown.
pub fn parser_for_content(content: &str) -> &'static dyn FormatParser {
    let first_line = content.split('\n').next().unwrap_or("").trim();
    if !first_line.is_empty() {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(first_line) {
            if value.is_object() {
                return &*JSONL;
            }
        }
    }
    if content::classify(content) == ContentType::Diff {
        return &DIFF;
    }
    &MARKDOWN
}
