//! One-line summaries of tool results found in conversation transcripts.
//!
//! A transcript's `toolUseResult` object carries no tool name, so the tool
//! is inferred from the result's shape: `stdout` means a shell command,
//! `file` a file read, `filenames` a file search, a bare `filePath` an
//! edit. Patch and todo results are handled elsewhere (as diff and
//! checklist parts) and are skipped here.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static ANSI_ESCAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\x1b\[[0-9;]*[a-zA-Z]").expect("Failed to compile ANSI escape regex")
});

/// Remove ANSI escape sequences from terminal output.
pub fn strip_ansi(content: &str) -> String {
    ANSI_ESCAPE.replace_all(content, "").into_owned()
}

/// Parsed tool result, reduced to the fields the summary line needs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToolOutput {
    pub tool_name: String,
    pub stdout: String,
    pub stderr: String,
    pub file_path: String,
    pub file_count: usize,
    pub files: Vec<String>,
}

impl ToolOutput {
    /// Interpret a `toolUseResult` value. Returns `None` for results that
    /// render elsewhere (structured patches, todo updates) and for shapes
    /// no known tool produces.
    pub fn from_result(result: &Value) -> Option<ToolOutput> {
        let obj = result.as_object()?;
        if obj.contains_key("structuredPatch") || obj.contains_key("newTodos") {
            return None;
        }

        if let Some(stdout) = obj.get("stdout").and_then(Value::as_str) {
            return Some(ToolOutput {
                tool_name: "Bash".to_string(),
                stdout: stdout.to_string(),
                stderr: obj
                    .get("stderr")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                ..Default::default()
            });
        }

        if let Some(file) = obj.get("file").and_then(Value::as_object) {
            return Some(ToolOutput {
                tool_name: "Read".to_string(),
                file_path: file
                    .get("filePath")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                stdout: file
                    .get("content")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                ..Default::default()
            });
        }

        if let Some(filenames) = obj.get("filenames").and_then(Value::as_array) {
            let files: Vec<String> = filenames
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect();
            let file_count = obj
                .get("numFiles")
                .and_then(Value::as_u64)
                .map_or(files.len(), |n| n as usize);
            return Some(ToolOutput {
                tool_name: "Glob".to_string(),
                file_count,
                files,
                ..Default::default()
            });
        }

        if let Some(file_path) = obj.get("filePath").and_then(Value::as_str) {
            return Some(ToolOutput {
                tool_name: "Edit".to_string(),
                file_path: file_path.to_string(),
                ..Default::default()
            });
        }

        None
    }

    /// The one-line form shown inside a conversation block.
    pub fn summary(&self) -> String {
        match self.tool_name.as_str() {
            "Bash" => {
                // The command itself is not part of the result payload, so
                // the first line of output stands in for it.
                let preview = first_line(&strip_ansi(&self.stdout));
                if preview.is_empty() {
                    "Bash: (no output)".to_string()
                } else {
                    format!("Bash: {preview}")
                }
            }
            "Read" => {
                if self.file_path.is_empty() {
                    "Read:".to_string()
                } else {
                    format!("Read: {}", self.file_path)
                }
            }
            "Glob" => {
                if self.file_count > 0 {
                    format!("Glob: ({} files)", self.file_count)
                } else {
                    "Glob:".to_string()
                }
            }
            "Edit" => {
                if self.file_path.is_empty() {
                    "Edit:".to_string()
                } else {
                    format!("Edit: {}", self.file_path)
                }
            }
            other => format!("{other}:"),
        }
    }
}

/// First non-empty line, trimmed and capped at 60 characters.
fn first_line(content: &str) -> String {
    for line in content.split('\n') {
        let line = line.trim();
        if !line.is_empty() {
            if line.chars().count() > 60 {
                let head: String = line.chars().take(60).collect();
                return format!("{head}...");
            }
            return line.to_string();
        }
    }
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bash_result_with_output() {
        let result = json!({"stdout": "total 16\ndrwxr-xr-x", "stderr": ""});
        let output = ToolOutput::from_result(&result).unwrap();
        assert_eq!(output.tool_name, "Bash");
        assert_eq!(output.summary(), "Bash: total 16");
    }

    #[test]
    fn test_bash_result_no_output() {
        let result = json!({"stdout": "", "stderr": "oops"});
        let output = ToolOutput::from_result(&result).unwrap();
        assert_eq!(output.stderr, "oops");
        assert_eq!(output.summary(), "Bash: (no output)");
    }

    #[test]
    fn test_bash_long_first_line_is_truncated() {
        let long = "x".repeat(80);
        let result = json!({ "stdout": long });
        let output = ToolOutput::from_result(&result).unwrap();
        let summary = output.summary();
        assert!(summary.starts_with("Bash: "));
        assert!(summary.ends_with("..."));
        assert_eq!(summary.chars().count(), "Bash: ".len() + 63);
    }

    #[test]
    fn test_ansi_codes_are_stripped_from_preview() {
        let result = json!({"stdout": "\u{1b}[32mgreen\u{1b}[0m text"});
        let output = ToolOutput::from_result(&result).unwrap();
        assert_eq!(output.summary(), "Bash: green text");
    }

    #[test]
    fn test_read_result() {
        let result = json!({"file": {"filePath": "/tmp/a.rs", "content": "fn main() {}"}});
        let output = ToolOutput::from_result(&result).unwrap();
        assert_eq!(output.tool_name, "Read");
        assert_eq!(output.stdout, "fn main() {}");
        assert_eq!(output.summary(), "Read: /tmp/a.rs");
    }

    #[test]
    fn test_glob_result_prefers_num_files() {
        let result = json!({"filenames": ["a.rs", "b.rs"], "numFiles": 5});
        let output = ToolOutput::from_result(&result).unwrap();
        assert_eq!(output.files.len(), 2);
        assert_eq!(output.file_count, 5);
        assert_eq!(output.summary(), "Glob: (5 files)");
    }

    #[test]
    fn test_edit_result_uses_file_path() {
        let result = json!({"filePath": "src/lib.rs", "oldString": "a", "newString": "b"});
        let output = ToolOutput::from_result(&result).unwrap();
        assert_eq!(output.summary(), "Edit: src/lib.rs");
    }

    #[test]
    fn test_patch_and_todo_results_are_skipped() {
        assert_eq!(
            ToolOutput::from_result(&json!({"structuredPatch": [], "filePath": "x"})),
            None
        );
        assert_eq!(ToolOutput::from_result(&json!({"newTodos": []})), None);
    }

    #[test]
    fn test_unrecognized_shapes_are_skipped() {
        assert_eq!(ToolOutput::from_result(&json!({"other": 1})), None);
        assert_eq!(ToolOutput::from_result(&json!("plain string")), None);
    }
}
