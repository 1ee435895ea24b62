//! Conversation transcript parsing (JSONL).
//!
//! Each line is an independent JSON object; the schema is externally
//! owned, so everything below the line envelope is navigated permissively
//! and malformed lines are skipped, never reported. One conversation turn
//! (a user message plus everything until the next user message) becomes
//! one block.
//!
//! The subtle part: `user`-typed lines are either genuine user messages
//! or tool-result wrappers, told apart by whether `message.content`
//! contains a `tool_result` item. Tool results never start turns; they
//! contribute inline diffs (synthesized from `structuredPatch`) and
//! one-line tool summaries to whichever turn is open.

use serde::Deserialize;
use serde_json::Value;
use strum_macros::Display;

use crate::block::{Block, Page, SourceKind};
use crate::content::ContentType;
use crate::page;
use crate::parser::FormatParser;
use crate::tool_output::ToolOutput;

/// Which transcript categories make it into parsed output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranscriptFilters {
    pub user: bool,
    pub assistant: bool,
    pub diff: bool,
    pub tool_result: bool,
}

impl Default for TranscriptFilters {
    fn default() -> Self {
        TranscriptFilters {
            user: true,
            assistant: true,
            diff: true,
            tool_result: false,
        }
    }
}

/// Logical category of a transcript line, as shown in the pre-parse
/// selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Category {
    User,
    Assistant,
    Diff,
    ToolResult,
    System,
    Other,
}

/// One selector row: how many lines fell into a category and whether it
/// starts out enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryCount {
    pub category: Category,
    pub count: usize,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct QuestionOption {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: String,
}

/// One question posed through the `AskUserQuestion` tool.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QuestionData {
    pub question: String,
    pub header: String,
    pub multi_select: bool,
    pub options: Vec<QuestionOption>,
}

/// One hunk of a `structuredPatch` tool result.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PatchHunk {
    old_start: u64,
    old_lines: u64,
    new_start: u64,
    new_lines: u64,
    lines: Vec<String>,
}

/// Line envelope. The `message` and `toolUseResult` interiors stay as
/// raw values: their shapes drift and partial data must still render.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct TranscriptLine {
    #[serde(rename = "type")]
    kind: String,
    message: Value,
    #[serde(rename = "toolUseResult")]
    tool_use_result: Value,
}

/// A parsed transcript line plus the accessors both the batch parser and
/// the follow-mode watcher dispatch on.
#[derive(Debug, Clone)]
pub struct ParsedLine {
    line: TranscriptLine,
}

/// Parse one raw transcript line. `None` for blank or malformed lines.
pub fn parse_line(raw: &str) -> Option<ParsedLine> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let line: TranscriptLine = serde_json::from_str(raw).ok()?;
    Some(ParsedLine { line })
}

impl ParsedLine {
    pub fn kind(&self) -> &str {
        &self.line.kind
    }

    fn content_items(&self) -> Option<&Vec<Value>> {
        self.line.message.get("content")?.as_array()
    }

    /// Whether this `user`-typed line wraps a tool result: any item of
    /// the content array is typed `tool_result`.
    pub fn is_tool_result(&self) -> bool {
        self.content_items().is_some_and(|items| {
            items
                .iter()
                .any(|item| item.get("type").and_then(Value::as_str) == Some("tool_result"))
        })
    }

    /// Text of a genuine user message: string content verbatim, or every
    /// `text` item of an array joined with newlines.
    pub fn user_text(&self) -> String {
        let Some(content) = self.line.message.get("content") else {
            return String::new();
        };
        if let Some(text) = content.as_str() {
            return text.to_string();
        }
        let Some(items) = content.as_array() else {
            return String::new();
        };
        let parts: Vec<&str> = items
            .iter()
            .filter(|item| item.get("type").and_then(Value::as_str) == Some("text"))
            .filter_map(|item| item.get("text").and_then(Value::as_str))
            .filter(|text| !text.is_empty())
            .collect();
        parts.join("\n")
    }

    /// Concatenated `text` items of an assistant message. Raw tool
    /// invocation markup is never shown: items containing
    /// `<function_calls>` or `<invoke` are dropped, and `tool_use` items
    /// are always hidden.
    pub fn assistant_text(&self) -> String {
        let Some(items) = self.content_items() else {
            return String::new();
        };
        let parts: Vec<&str> = items
            .iter()
            .filter(|item| item.get("type").and_then(Value::as_str) == Some("text"))
            .filter_map(|item| item.get("text").and_then(Value::as_str))
            .filter(|text| !text.contains("<function_calls>") && !text.contains("<invoke"))
            .collect();
        parts.join("\n")
    }

    /// Whether the line carries a non-empty `toolUseResult.structuredPatch`.
    pub fn has_patch(&self) -> bool {
        self.line
            .tool_use_result
            .get("structuredPatch")
            .and_then(Value::as_array)
            .is_some_and(|patch| !patch.is_empty())
    }

    /// Synthesize a unified diff from the structured patch, plus the
    /// patched file's path. The output must stay bit-for-bit compatible
    /// with what [`crate::diff::parse_hunks`] consumes.
    pub fn patch_diff(&self) -> Option<(String, String)> {
        let patch = self
            .line
            .tool_use_result
            .get("structuredPatch")
            .and_then(Value::as_array)?;
        if patch.is_empty() {
            return None;
        }
        let path = self
            .line
            .tool_use_result
            .get("filePath")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let header_path = if path.is_empty() { "file" } else { &path };

        let mut diff = String::new();
        diff.push_str(&format!("--- a/{header_path}\n"));
        diff.push_str(&format!("+++ b/{header_path}\n"));
        for hunk_value in patch {
            let Ok(hunk) = serde_json::from_value::<PatchHunk>(hunk_value.clone()) else {
                continue;
            };
            diff.push_str(&format!(
                "@@ -{},{} +{},{} @@\n",
                hunk.old_start, hunk.old_lines, hunk.new_start, hunk.new_lines
            ));
            for line in &hunk.lines {
                diff.push_str(line);
                diff.push('\n');
            }
        }
        Some((diff, path))
    }

    /// One-line tool summary from `toolUseResult`, falling back to the
    /// first `tool_result` item's string content. `None` when there is
    /// nothing displayable (or the result renders elsewhere as a diff or
    /// todo list).
    pub fn tool_summary(&self) -> Option<String> {
        if let Some(output) = ToolOutput::from_result(&self.line.tool_use_result) {
            return Some(output.summary());
        }
        let items = self.content_items()?;
        for item in items {
            if item.get("type").and_then(Value::as_str) != Some("tool_result") {
                continue;
            }
            if let Some(text) = item.get("content").and_then(Value::as_str) {
                if !text.is_empty() {
                    let output = ToolOutput {
                        tool_name: "Tool".to_string(),
                        stdout: text.to_string(),
                        ..Default::default()
                    };
                    return Some(output.summary());
                }
            }
        }
        None
    }

    /// Every question posed by an `AskUserQuestion` tool use on this
    /// line, in order. Empty for everything else.
    pub fn questions(&self) -> Vec<QuestionData> {
        let Some(items) = self.content_items() else {
            return Vec::new();
        };
        for item in items {
            if item.get("type").and_then(Value::as_str) != Some("tool_use") {
                continue;
            }
            if item.get("name").and_then(Value::as_str) != Some("AskUserQuestion") {
                continue;
            }
            let Some(questions) = item
                .get("input")
                .and_then(|input| input.get("questions"))
                .and_then(Value::as_array)
            else {
                continue;
            };
            return questions
                .iter()
                .filter_map(|q| serde_json::from_value(q.clone()).ok())
                .collect();
        }
        Vec::new()
    }
}

/// Render one question as display text, with a `Qn/total` prefix when it
/// is part of a multi-question prompt (pass `total <= 1` to omit it).
pub fn format_question_indexed(data: &QuestionData, index: usize, total: usize) -> String {
    let mut out = String::new();
    if total > 1 {
        out.push_str(&format!("Q{index}/{total} "));
    }
    if !data.header.is_empty() {
        out.push_str(&data.header);
        out.push('\n');
    }
    out.push('\n');
    out.push_str(&data.question);
    out.push_str("\n\n");
    for (i, option) in data.options.iter().enumerate() {
        out.push_str(&format!("  {}. {}", i + 1, option.label));
        if !option.description.is_empty() {
            out.push_str(&format!(" - {}", option.description));
        }
        out.push('\n');
    }
    out.push_str(&format!(
        "  {}. Other (custom text)\n",
        data.options.len() + 1
    ));
    if data.multi_select {
        out.push_str("\n(multi-select: e.g. 1,3)\n");
    }
    out
}

pub fn format_question(data: &QuestionData) -> String {
    format_question_indexed(data, 0, 0)
}

/// One piece of a conversation turn, in transcript order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnPart {
    User(String),
    /// A synthesized unified diff plus the patched file's path.
    Diff { diff: String, path: String },
    Assistant(String),
    ToolResult(String),
    Question(String),
}

/// A user message and everything that follows it until the next user
/// message. Turns are transient: each becomes exactly one block, and the
/// follow-mode watcher re-renders the open turn's block as parts arrive.
#[derive(Debug, Clone)]
pub struct Turn {
    pub number: usize,
    pub parts: Vec<TurnPart>,
    pub origin_line: usize,
}

impl Turn {
    pub fn open(number: usize, user_text: String, origin_line: usize) -> Self {
        Turn {
            number,
            parts: vec![TurnPart::User(user_text)],
            origin_line,
        }
    }

    /// Render the turn into its block: parts in chronological order,
    /// double-newline separated, one page (turns are never paginated).
    pub fn to_block(&self) -> Block {
        let rendered: Vec<String> = self.parts.iter().map(render_part).collect();
        let content = rendered.join("\n\n");
        Block {
            name: format!("block-{}", self.number),
            content: content.clone(),
            pages: vec![Page::Lines(content)],
            content_type: ContentType::Plain,
            page_meta: Vec::new(),
            source: SourceKind::Chat,
            origin_line: self.origin_line,
        }
    }
}

fn render_part(part: &TurnPart) -> String {
    match part {
        TurnPart::User(text) => format!("\u{276f} {text}"),
        TurnPart::Diff { diff, path } => {
            let base = path.rsplit('/').next().unwrap_or(path);
            let base = if base.is_empty() { "file" } else { base };
            format!("--- {base} ---\n{}", inline_diff_body(diff))
        }
        TurnPart::Assistant(text) => text.clone(),
        TurnPart::ToolResult(summary) => summary.clone(),
        TurnPart::Question(text) => format!("[?] {text}"),
    }
}

/// Diff body for inline display in a turn: the `---`/`+++` file headers
/// drop out (the part has its own filename header), everything else stays
/// verbatim so renderers can restyle by prefix.
fn inline_diff_body(diff: &str) -> String {
    let body = diff
        .split('\n')
        .filter(|line| !line.starts_with("---") && !line.starts_with("+++"))
        .collect::<Vec<_>>()
        .join("\n");
    body.strip_suffix('\n').unwrap_or(&body).to_string()
}

/// Count the categories present in a transcript, with the selector's
/// default enablement (user, assistant and diff start on). Read-only: the
/// user/tool-result disambiguation mirrors [`JsonlParser::parse`] exactly
/// but nothing is built.
pub fn scan_categories(content: &str) -> Vec<CategoryCount> {
    let mut user = 0;
    let mut assistant = 0;
    let mut diff = 0;
    let mut tool_result = 0;
    let mut system = 0;
    let mut other = 0;

    for raw in content.split('\n') {
        let Some(line) = parse_line(raw) else {
            continue;
        };
        match line.kind() {
            "" => {}
            "user" => {
                if line.is_tool_result() {
                    tool_result += 1;
                    if line.has_patch() {
                        diff += 1;
                    }
                } else if has_countable_user_content(&line) {
                    user += 1;
                }
            }
            "assistant" => assistant += 1,
            "system" => system += 1,
            _ => other += 1,
        }
    }

    let ordered = [
        (Category::User, user, true),
        (Category::Assistant, assistant, true),
        (Category::Diff, diff, true),
        (Category::ToolResult, tool_result, false),
        (Category::System, system, false),
        (Category::Other, other, false),
    ];
    ordered
        .into_iter()
        .filter(|(_, count, _)| *count > 0)
        .map(|(category, count, enabled)| CategoryCount {
            category,
            count,
            enabled,
        })
        .collect()
}

/// String content, or an array with at least one object item, counts as
/// a user message for the selector census.
fn has_countable_user_content(line: &ParsedLine) -> bool {
    let Some(content) = line.line.message.get("content") else {
        return false;
    };
    if content.is_string() {
        return true;
    }
    content
        .as_array()
        .is_some_and(|items| items.iter().any(Value::is_object))
}

#[derive(Debug, Default)]
pub struct JsonlParser {
    pub filters: TranscriptFilters,
}

impl JsonlParser {
    pub fn with_filters(filters: TranscriptFilters) -> Self {
        JsonlParser { filters }
    }

    /// Streaming variant for follow mode: exactly one line, an externally
    /// supplied turn counter, at most one block out. Turn continuity is
    /// the caller's problem — this never holds state across calls.
    pub fn parse_single_line(&self, raw: &str, turn_number: usize) -> Option<Block> {
        let line = parse_line(raw)?;
        match line.kind() {
            "user" if line.is_tool_result() => {
                if !self.filters.diff {
                    return None;
                }
                let (diff, path) = line.patch_diff()?;
                Some(patch_block(&diff, &path, turn_number))
            }
            "user" => {
                if !self.filters.user {
                    return None;
                }
                let text = line.user_text();
                if text.is_empty() {
                    return None;
                }
                Some(stream_block(turn_number, format!("\u{276f} {text}")))
            }
            "assistant" => {
                if !self.filters.assistant {
                    return None;
                }
                let text = line.assistant_text();
                if text.is_empty() {
                    return None;
                }
                Some(stream_block(turn_number, text))
            }
            _ => None,
        }
    }
}

/// Single-page chat block for one streamed message.
fn stream_block(turn_number: usize, content: String) -> Block {
    Block {
        name: format!("block-{turn_number}"),
        content: content.clone(),
        pages: vec![Page::Lines(content)],
        content_type: ContentType::Plain,
        page_meta: Vec::new(),
        source: SourceKind::Chat,
        origin_line: 0,
    }
}

/// Standalone block for a streamed structured patch, hunk-paginated.
fn patch_block(diff: &str, path: &str, number: usize) -> Block {
    let display = if path.is_empty() {
        format!("diff-{number}")
    } else {
        path.rsplit('/').next().unwrap_or(path).to_string()
    };
    Block {
        name: format!("diff: {display}"),
        content: diff.to_string(),
        pages: page::hunk_pages(diff),
        content_type: ContentType::Diff,
        page_meta: Vec::new(),
        source: SourceKind::Other,
        origin_line: 0,
    }
}

impl FormatParser for JsonlParser {
    fn name(&self) -> &'static str {
        "jsonl"
    }

    fn detect(&self, path: &str) -> bool {
        path.to_lowercase().ends_with(".jsonl")
    }

    fn parse(&self, content: &str) -> Vec<Block> {
        let filters = self.filters;
        let mut blocks = Vec::new();
        let mut turn: Option<Turn> = None;
        let mut turn_number = 0;

        for (index, raw) in content.split('\n').enumerate() {
            let Some(line) = parse_line(raw) else {
                continue;
            };
            match line.kind() {
                "user" if line.is_tool_result() => {
                    // Tool results never start turns; with no turn open
                    // they contribute nothing.
                    let Some(open) = turn.as_mut() else {
                        continue;
                    };
                    if filters.diff {
                        if let Some((diff, path)) = line.patch_diff() {
                            open.parts.push(TurnPart::Diff { diff, path });
                        }
                    }
                    if filters.tool_result {
                        if let Some(summary) = line.tool_summary() {
                            open.parts.push(TurnPart::ToolResult(summary));
                        }
                    }
                }
                "user" => {
                    if !filters.user {
                        continue;
                    }
                    let text = line.user_text();
                    if text.is_empty() {
                        continue;
                    }
                    if let Some(done) = turn.take() {
                        blocks.push(done.to_block());
                    }
                    turn_number += 1;
                    turn = Some(Turn::open(turn_number, text, index + 1));
                }
                "assistant" => {
                    if !filters.assistant {
                        continue;
                    }
                    let Some(open) = turn.as_mut() else {
                        continue;
                    };
                    let text = line.assistant_text();
                    if !text.is_empty() {
                        open.parts.push(TurnPart::Assistant(text));
                    }
                }
                _ => {}
            }
        }

        if let Some(done) = turn {
            blocks.push(done.to_block());
        }
        blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::parse_hunks;

    fn user_line(text: &str) -> String {
        format!(r#"{{"type":"user","message":{{"content":"{text}"}}}}"#)
    }

    fn assistant_line(text: &str) -> String {
        format!(
            r#"{{"type":"assistant","message":{{"content":[{{"type":"text","text":"{text}"}}]}}}}"#
        )
    }

    fn tool_result_line() -> String {
        r#"{"type":"user","message":{"content":[{"type":"tool_result","content":"ok"}]},"toolUseResult":{"stdout":"done","stderr":""}}"#
            .to_string()
    }

    fn patch_line(path: &str) -> String {
        format!(
            r#"{{"type":"user","message":{{"content":[{{"type":"tool_result","content":"edited"}}]}},"toolUseResult":{{"filePath":"{path}","structuredPatch":[{{"oldStart":3,"oldLines":2,"newStart":3,"newLines":3,"lines":[" ctx","-old","+new","+more"]}}]}}}}"#
        )
    }

    #[test]
    fn test_turn_boundaries() {
        let content = [user_line("hi"), assistant_line("reply"), user_line("bye")].join("\n");
        let blocks = JsonlParser::default().parse(&content);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].name, "block-1");
        assert!(blocks[0].content.contains("hi"));
        assert!(blocks[0].content.contains("reply"));
        assert_eq!(blocks[1].name, "block-2");
        assert!(blocks[1].content.contains("bye"));
        assert!(!blocks[1].content.contains("reply"));
    }

    #[test]
    fn test_turn_blocks_are_single_page_chat() {
        let content = [user_line("hi"), assistant_line("reply")].join("\n");
        let blocks = JsonlParser::default().parse(&content);
        assert_eq!(blocks[0].page_count(), 1);
        assert_eq!(blocks[0].source, SourceKind::Chat);
        assert_eq!(blocks[0].content_type, ContentType::Plain);
        assert_eq!(blocks[0].origin_line, 1);
    }

    #[test]
    fn test_user_part_carries_prompt_marker() {
        let blocks = JsonlParser::default().parse(&user_line("run the tests"));
        assert!(blocks[0].content.starts_with("\u{276f} run the tests"));
    }

    #[test]
    fn test_tool_results_never_start_turns() {
        // Leading tool result with no open turn contributes nothing, even
        // with every filter enabled.
        let filters = TranscriptFilters {
            tool_result: true,
            ..Default::default()
        };
        let content = [tool_result_line(), user_line("hi")].join("\n");
        let blocks = JsonlParser::with_filters(filters).parse(&content);
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].content.contains("hi"));
        assert!(!blocks[0].content.contains("done"));
    }

    #[test]
    fn test_tool_summary_included_when_enabled() {
        let filters = TranscriptFilters {
            tool_result: true,
            ..Default::default()
        };
        let content = [user_line("hi"), tool_result_line()].join("\n");
        let blocks = JsonlParser::with_filters(filters).parse(&content);
        assert!(blocks[0].content.contains("Bash: done"));
    }

    #[test]
    fn test_tool_summary_excluded_by_default() {
        let content = [user_line("hi"), tool_result_line()].join("\n");
        let blocks = JsonlParser::default().parse(&content);
        assert!(!blocks[0].content.contains("Bash"));
    }

    #[test]
    fn test_assistant_filter_gates_all_assistant_parts() {
        let filters = TranscriptFilters {
            assistant: false,
            ..Default::default()
        };
        let content = [
            user_line("one"),
            assistant_line("hidden"),
            user_line("two"),
            assistant_line("also hidden"),
        ]
        .join("\n");
        let blocks = JsonlParser::with_filters(filters).parse(&content);
        assert_eq!(blocks.len(), 2);
        for block in &blocks {
            assert!(!block.content.contains("hidden"));
        }
    }

    #[test]
    fn test_user_filter_disables_turn_creation() {
        let filters = TranscriptFilters {
            user: false,
            ..Default::default()
        };
        let content = [user_line("hi"), assistant_line("reply")].join("\n");
        assert!(JsonlParser::with_filters(filters).parse(&content).is_empty());
    }

    #[test]
    fn test_patch_becomes_inline_diff_part() {
        let content = [user_line("edit it"), patch_line("src/deep/main.rs")].join("\n");
        let blocks = JsonlParser::default().parse(&content);
        assert_eq!(blocks.len(), 1);
        let body = &blocks[0].content;
        // Filename header uses the basename, file headers are stripped,
        // change lines stay verbatim.
        assert!(body.contains("--- main.rs ---"));
        assert!(!body.contains("--- a/src/deep/main.rs"));
        assert!(body.contains("@@ -3,2 +3,3 @@"));
        assert!(body.contains("-old"));
        assert!(body.contains("+more"));
    }

    #[test]
    fn test_synthesized_diff_round_trips_through_hunk_parser() {
        let line = parse_line(&patch_line("src/lib.rs")).unwrap();
        let (diff, path) = line.patch_diff().unwrap();
        assert_eq!(path, "src/lib.rs");
        assert!(diff.starts_with("--- a/src/lib.rs\n+++ b/src/lib.rs\n"));
        let hunks = parse_hunks(&diff);
        assert_eq!(hunks.len(), 1);
        assert_eq!(hunks[0].old_start, 3);
        assert_eq!(hunks[0].new_start, 3);
        assert_eq!(hunks[0].added_count(), 2);
        assert_eq!(hunks[0].removed_count(), 1);
    }

    #[test]
    fn test_diff_filter_suppresses_patches() {
        let filters = TranscriptFilters {
            diff: false,
            ..Default::default()
        };
        let content = [user_line("edit"), patch_line("a.rs")].join("\n");
        let blocks = JsonlParser::with_filters(filters).parse(&content);
        assert!(!blocks[0].content.contains("@@"));
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let content = format!(
            "{}\nnot json at all\n{{\"type\":42}}\n{}",
            user_line("first"),
            user_line("second")
        );
        let blocks = JsonlParser::default().parse(&content);
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn test_assistant_tool_markup_is_hidden() {
        let content = [
            user_line("go"),
            r#"{"type":"assistant","message":{"content":[{"type":"text","text":"visible"},{"type":"text","text":"<function_calls>raw</function_calls>"},{"type":"tool_use","name":"Bash","input":{}}]}}"#.to_string(),
        ]
        .join("\n");
        let blocks = JsonlParser::default().parse(&content);
        assert!(blocks[0].content.contains("visible"));
        assert!(!blocks[0].content.contains("function_calls"));
        assert!(!blocks[0].content.contains("Bash"));
    }

    #[test]
    fn test_empty_user_text_does_not_cut_a_turn() {
        let content = [
            user_line("start"),
            assistant_line("mid"),
            r#"{"type":"user","message":{"content":""}}"#.to_string(),
            assistant_line("tail"),
        ]
        .join("\n");
        let blocks = JsonlParser::default().parse(&content);
        // The empty user message neither closes nor duplicates the turn.
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].content.contains("tail"));
    }

    #[test]
    fn test_parse_is_idempotent() {
        let content = [user_line("a"), assistant_line("b"), patch_line("c.rs")].join("\n");
        let parser = JsonlParser::default();
        assert_eq!(parser.parse(&content), parser.parse(&content));
    }

    #[test]
    fn test_scan_counts_and_defaults() {
        let content = [
            user_line("hi"),
            assistant_line("yo"),
            patch_line("x.rs"),
            tool_result_line(),
            r#"{"type":"system","subtype":"init"}"#.to_string(),
            r#"{"type":"file-history-snapshot"}"#.to_string(),
        ]
        .join("\n");
        let counts = scan_categories(&content);
        let get = |c: Category| counts.iter().find(|e| e.category == c).copied();

        let user = get(Category::User).unwrap();
        assert_eq!((user.count, user.enabled), (1, true));
        let tool = get(Category::ToolResult).unwrap();
        assert_eq!((tool.count, tool.enabled), (2, false));
        let diff = get(Category::Diff).unwrap();
        assert_eq!((diff.count, diff.enabled), (1, true));
        let system = get(Category::System).unwrap();
        assert_eq!((system.count, system.enabled), (1, false));
        let other = get(Category::Other).unwrap();
        assert_eq!(other.count, 1);
        // Ordering is fixed for the selector.
        let names: Vec<String> = counts.iter().map(|e| e.category.to_string()).collect();
        assert_eq!(names, vec!["user", "assistant", "diff", "tool_result", "system", "other"]);
    }

    #[test]
    fn test_scan_skips_absent_categories() {
        let counts = scan_categories(&user_line("only"));
        assert_eq!(counts.len(), 1);
        assert_eq!(counts[0].category, Category::User);
    }

    #[test]
    fn test_category_display_names() {
        assert_eq!(Category::ToolResult.to_string(), "tool_result");
        assert_eq!(Category::User.to_string(), "user");
    }

    #[test]
    fn test_question_extraction() {
        let line = r#"{"type":"assistant","message":{"content":[{"type":"tool_use","name":"AskUserQuestion","input":{"questions":[{"question":"Deploy now?","header":"Release","multiSelect":false,"options":[{"label":"Yes","description":"ship it"},{"label":"No"}]},{"question":"Which env?","options":[{"label":"prod"}]}]}}]}}"#;
        let parsed = parse_line(line).unwrap();
        let questions = parsed.questions();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].question, "Deploy now?");
        assert_eq!(questions[0].header, "Release");
        assert_eq!(questions[0].options.len(), 2);
        assert_eq!(questions[0].options[0].description, "ship it");
        assert_eq!(questions[1].question, "Which env?");
        assert!(parse_line(&assistant_line("plain")).unwrap().questions().is_empty());
    }

    #[test]
    fn test_question_formatting() {
        let data = QuestionData {
            question: "Deploy now?".to_string(),
            header: "Release".to_string(),
            multi_select: true,
            options: vec![
                QuestionOption {
                    label: "Yes".to_string(),
                    description: "ship it".to_string(),
                },
                QuestionOption {
                    label: "No".to_string(),
                    description: String::new(),
                },
            ],
        };
        let text = format_question_indexed(&data, 1, 2);
        assert!(text.starts_with("Q1/2 Release\n"));
        assert!(text.contains("\nDeploy now?\n"));
        assert!(text.contains("  1. Yes - ship it\n"));
        assert!(text.contains("  2. No\n"));
        assert!(text.contains("  3. Other (custom text)\n"));
        assert!(text.contains("(multi-select: e.g. 1,3)"));
        // Single-question form has no index prefix.
        assert!(format_question(&data).starts_with("Release\n"));
    }

    #[test]
    fn test_parse_single_line_user_and_assistant() {
        let parser = JsonlParser::default();
        let block = parser.parse_single_line(&user_line("hello"), 4).unwrap();
        assert_eq!(block.name, "block-4");
        assert_eq!(block.content, "\u{276f} hello");
        assert_eq!(block.page_count(), 1);

        let block = parser.parse_single_line(&assistant_line("sure"), 4).unwrap();
        assert_eq!(block.name, "block-4");
        assert_eq!(block.content, "sure");

        assert!(parser.parse_single_line("garbage", 1).is_none());
        assert!(
            parser
                .parse_single_line(r#"{"type":"summary","summary":"s"}"#, 1)
                .is_none()
        );
    }

    #[test]
    fn test_parse_single_line_patch_block() {
        let parser = JsonlParser::default();
        let block = parser.parse_single_line(&patch_line("src/lib.rs"), 7).unwrap();
        assert_eq!(block.name, "diff: lib.rs");
        assert_eq!(block.content_type, ContentType::Diff);
        assert_eq!(block.page_count(), 1);
        // Plain tool results produce no standalone block.
        assert!(parser.parse_single_line(&tool_result_line(), 7).is_none());
    }

    #[test]
    fn test_parse_single_line_respects_filters() {
        let parser = JsonlParser::with_filters(TranscriptFilters {
            user: false,
            assistant: false,
            diff: false,
            tool_result: true,
        });
        assert!(parser.parse_single_line(&user_line("x"), 1).is_none());
        assert!(parser.parse_single_line(&assistant_line("y"), 1).is_none());
        assert!(parser.parse_single_line(&patch_line("z.rs"), 1).is_none());
    }
}
