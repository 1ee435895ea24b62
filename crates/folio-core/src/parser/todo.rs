//! Task checklist files (`.json`).
//!
//! A todo file is a JSON array of `{content, status, activeForm}` items.
//! The whole list renders as one single-page block with a progress header
//! and a status glyph per item. Anything that is not such an array yields
//! no blocks, letting the file fall through to another parser.

use serde::Deserialize;

use crate::block::{Block, Page, SourceKind};
use crate::content::ContentType;
use crate::parser::FormatParser;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TodoItem {
    pub content: String,
    pub status: String,
    #[serde(rename = "activeForm")]
    pub active_form: String,
}

#[derive(Debug, Default)]
pub struct TodoParser;

impl FormatParser for TodoParser {
    fn name(&self) -> &'static str {
        "todo"
    }

    fn detect(&self, path: &str) -> bool {
        path.to_lowercase().ends_with(".json")
    }

    fn parse(&self, content: &str) -> Vec<Block> {
        let Ok(todos) = serde_json::from_str::<Vec<TodoItem>>(content) else {
            return Vec::new();
        };
        if todos.is_empty() {
            return Vec::new();
        }

        let completed = todos.iter().filter(|t| t.status == "completed").count();

        let mut body = String::new();
        body.push_str(&format!("todos ({completed}/{} completed)\n\n", todos.len()));
        for todo in &todos {
            let glyph = match todo.status.as_str() {
                "completed" => '\u{2713}',
                "in_progress" => '\u{2192}',
                _ => '\u{25cb}',
            };
            body.push_str(&format!("{glyph} {}\n", todo.content));
        }

        // Checklists stay on one page no matter how long they get.
        vec![Block {
            name: format!("todos {completed}/{}", todos.len()),
            content: body.clone(),
            pages: vec![Page::Lines(body)],
            content_type: ContentType::Plain,
            page_meta: Vec::new(),
            source: SourceKind::Other,
            origin_line: 0,
        }]
    }
}
