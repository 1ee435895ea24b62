//! Command-driven navigation over a block index.
//!
//! The navigator owns the [`BlockIndex`] plus the cursor: which block is
//! current and which of its pages is showing. Frontends feed it raw input
//! (or map keys onto the same commands) and render whatever
//! [`Outcome`] comes back.

use crate::block::Block;
use crate::index::BlockIndex;

const MAX_HISTORY: usize = 10;

/// A parsed navigation command. Single letters alias the full words:
/// `j` next, `k` prev, `l` list, `i` jump, `h` help, `q` quit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Jump(String),
    Next,
    Prev,
    List,
    Help,
    Quit,
}

impl Command {
    /// Parse user input. `None` for blank or unrecognized input.
    pub fn parse(input: &str) -> Option<Command> {
        let mut words = input.split_whitespace();
        let action = words.next()?.to_lowercase();
        match action.as_str() {
            "jump" | "i" => Some(Command::Jump(words.collect::<Vec<_>>().join(" "))),
            "next" | "j" => Some(Command::Next),
            "prev" | "k" => Some(Command::Prev),
            "list" | "l" => Some(Command::List),
            "help" | "h" => Some(Command::Help),
            "quit" | "exit" | "q" => Some(Command::Quit),
            _ => None,
        }
    }
}

/// What a command did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Text to show: help, the block list, or an error.
    Message(String),
    /// The cursor landed on the block at this position.
    Moved(usize),
    Exit,
}

#[derive(Debug)]
pub struct Navigator {
    index: BlockIndex,
    position: usize,
    page: usize,
    history: Vec<usize>,
}

impl Navigator {
    pub fn new(index: BlockIndex) -> Self {
        Navigator {
            index,
            position: 0,
            page: 0,
            history: Vec::new(),
        }
    }

    pub fn index(&self) -> &BlockIndex {
        &self.index
    }

    /// Mutable access for live updates; the cursor is clamped afterwards
    /// by [`Self::sync`].
    pub fn index_mut(&mut self) -> &mut BlockIndex {
        &mut self.index
    }

    /// Clamp the cursor after the index changed underneath it.
    pub fn sync(&mut self) {
        if self.index.is_empty() {
            self.position = 0;
            self.page = 0;
            return;
        }
        if self.position >= self.index.len() {
            self.position = self.index.len() - 1;
            self.page = 0;
        }
        let pages = self.index.get(self.position).map_or(1, Block::page_count);
        if self.page >= pages {
            self.page = pages.saturating_sub(1);
        }
    }

    pub fn current_block(&self) -> Option<&Block> {
        self.index.get(self.position)
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn block_count(&self) -> usize {
        self.index.len()
    }

    /// 0-based page within the current block.
    pub fn page(&self) -> usize {
        self.page
    }

    /// Positions visited before the current one, oldest first, capped at
    /// ten entries.
    pub fn history(&self) -> &[usize] {
        &self.history
    }

    /// Move the cursor to an absolute position (follow mode jumps to the
    /// newest block this way). `false` when out of range.
    pub fn jump_to(&mut self, position: usize) -> bool {
        if position >= self.index.len() {
            return false;
        }
        self.remember();
        self.position = position;
        self.page = 0;
        true
    }

    /// Run one line of user input through parse-and-execute.
    pub fn execute(&mut self, input: &str) -> Outcome {
        let Some(command) = Command::parse(input) else {
            let word = input.split_whitespace().next().unwrap_or_default();
            let message = if word.is_empty() {
                "Invalid command. Type 'help' for available commands.".to_string()
            } else {
                format!("Unknown command: {word}. Type 'help' for available commands.")
            };
            return Outcome::Message(message);
        };
        self.run(&command)
    }

    pub fn run(&mut self, command: &Command) -> Outcome {
        match command {
            Command::Jump(query) => self.jump(query),
            Command::Next => self.next_block(),
            Command::Prev => self.prev_block(),
            Command::List => Outcome::Message(list_text(&self.index.names())),
            Command::Help => Outcome::Message(help_text().to_string()),
            Command::Quit => Outcome::Exit,
        }
    }

    fn jump(&mut self, query: &str) -> Outcome {
        if query.is_empty() {
            return Outcome::Message(
                "Usage: jump <block-name> (jump to a named block)".to_string(),
            );
        }
        let Some(position) = self.index.find(query) else {
            return Outcome::Message(not_found_text(query, &self.index.names()));
        };
        self.remember();
        self.position = position;
        self.page = 0;
        Outcome::Moved(position)
    }

    fn next_block(&mut self) -> Outcome {
        if self.position + 1 >= self.index.len() {
            return Outcome::Message("Already at the last block.".to_string());
        }
        self.remember();
        self.position += 1;
        self.page = 0;
        Outcome::Moved(self.position)
    }

    fn prev_block(&mut self) -> Outcome {
        if self.position == 0 {
            return Outcome::Message("Already at the first block.".to_string());
        }
        self.remember();
        self.position -= 1;
        self.page = 0;
        Outcome::Moved(self.position)
    }

    fn remember(&mut self) {
        self.history.push(self.position);
        if self.history.len() > MAX_HISTORY {
            self.history.remove(0);
        }
    }

    /// Advance one page within the current block. `false` at the last page.
    pub fn next_page(&mut self) -> bool {
        let Some(block) = self.current_block() else {
            return false;
        };
        if self.page + 1 >= block.page_count() {
            return false;
        }
        self.page += 1;
        true
    }

    /// Step back one page within the current block. `false` at the first.
    pub fn prev_page(&mut self) -> bool {
        if self.page == 0 {
            return false;
        }
        self.page -= 1;
        true
    }
}

fn list_text(names: &[&str]) -> String {
    if names.is_empty() {
        return "No blocks found.".to_string();
    }
    format!("Available blocks: {}", names.join(" | "))
}

fn help_text() -> &'static str {
    "Commands (single-letter preferred):\n  \
     j              - next block\n  \
     k              - prev block\n  \
     l              - list all blocks\n  \
     i <name>       - jump to block (fuzzy match)\n  \
     h              - show help\n  \
     q              - quit\n\n  \
     next           - go to next block\n  \
     prev           - go to previous block\n  \
     list           - show all available blocks\n  \
     jump <name>    - jump to a block\n  \
     help           - show this help\n  \
     quit / exit    - exit program"
}

fn not_found_text(query: &str, names: &[&str]) -> String {
    let mut message = format!("Block '{query}' not found.");
    let lower = query.to_lowercase();
    let matches: Vec<&str> = names
        .iter()
        .filter(|name| name.to_lowercase().contains(&lower))
        .take(3)
        .copied()
        .collect();
    if !matches.is_empty() {
        message.push_str(&format!("\nDid you mean: {}?", matches.join(", ")));
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::SourceKind;

    fn sample_index() -> BlockIndex {
        let names = ["Introduction", "Setup", "Usage", "Appendix"];
        BlockIndex::new(
            names
                .iter()
                .map(|name| {
                    Block::from_content(*name, format!("{name} body"), 0, SourceKind::Markdown)
                })
                .collect(),
        )
    }

    #[test]
    fn test_parse_aliases_and_words() {
        assert_eq!(Command::parse("j"), Some(Command::Next));
        assert_eq!(Command::parse("next"), Some(Command::Next));
        assert_eq!(Command::parse("K"), Some(Command::Prev));
        assert_eq!(Command::parse("l"), Some(Command::List));
        assert_eq!(Command::parse("h"), Some(Command::Help));
        assert_eq!(Command::parse("exit"), Some(Command::Quit));
        assert_eq!(
            Command::parse("i intro section"),
            Some(Command::Jump("intro section".to_string()))
        );
        assert_eq!(Command::parse("jump"), Some(Command::Jump(String::new())));
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("   "), None);
        assert_eq!(Command::parse("frobnicate"), None);
    }

    #[test]
    fn test_next_prev_walk_blocks() {
        let mut nav = Navigator::new(sample_index());
        assert_eq!(nav.execute("j"), Outcome::Moved(1));
        assert_eq!(nav.execute("j"), Outcome::Moved(2));
        assert_eq!(nav.execute("k"), Outcome::Moved(1));
        assert_eq!(nav.current_block().unwrap().name, "Setup");
    }

    #[test]
    fn test_boundaries_report_messages() {
        let mut nav = Navigator::new(sample_index());
        assert_eq!(
            nav.execute("k"),
            Outcome::Message("Already at the first block.".to_string())
        );
        for _ in 0..3 {
            nav.execute("j");
        }
        assert_eq!(
            nav.execute("j"),
            Outcome::Message("Already at the last block.".to_string())
        );
        assert_eq!(nav.position(), 3);
    }

    #[test]
    fn test_jump_by_name_resets_page() {
        let mut nav = Navigator::new(sample_index());
        assert_eq!(nav.execute("i usage"), Outcome::Moved(2));
        assert_eq!(nav.page(), 0);
        assert_eq!(nav.current_block().unwrap().name, "Usage");
    }

    #[test]
    fn test_jump_without_argument_shows_usage() {
        let mut nav = Navigator::new(sample_index());
        let Outcome::Message(message) = nav.execute("jump") else {
            panic!("expected a message");
        };
        assert!(message.starts_with("Usage: jump"));
    }

    #[test]
    fn test_jump_miss_suggests_near_names() {
        let mut nav = Navigator::new(sample_index());
        let Outcome::Message(message) = nav.execute("i xyzzy up") else {
            panic!("expected a message");
        };
        assert!(message.starts_with("Block 'xyzzy up' not found."));
        // A miss with no overlapping names suggests nothing.
        let Outcome::Message(message) = nav.execute("i qqq") else {
            panic!("expected a message");
        };
        assert!(!message.contains("Did you mean"));
    }

    #[test]
    fn test_unknown_and_blank_input() {
        let mut nav = Navigator::new(sample_index());
        let Outcome::Message(message) = nav.execute("frob it") else {
            panic!("expected a message");
        };
        assert_eq!(
            message,
            "Unknown command: frob. Type 'help' for available commands."
        );
        let Outcome::Message(message) = nav.execute("   ") else {
            panic!("expected a message");
        };
        assert!(message.starts_with("Invalid command."));
    }

    #[test]
    fn test_list_and_help() {
        let mut nav = Navigator::new(sample_index());
        assert_eq!(
            nav.execute("l"),
            Outcome::Message(
                "Available blocks: Introduction | Setup | Usage | Appendix".to_string()
            )
        );
        let Outcome::Message(help) = nav.execute("h") else {
            panic!("expected a message");
        };
        assert!(help.contains("jump <name>"));
        assert_eq!(nav.execute("q"), Outcome::Exit);
    }

    #[test]
    fn test_empty_index_lists_nothing() {
        let mut nav = Navigator::new(BlockIndex::new(Vec::new()));
        assert_eq!(
            nav.execute("l"),
            Outcome::Message("No blocks found.".to_string())
        );
        assert!(nav.current_block().is_none());
        assert_eq!(
            nav.execute("j"),
            Outcome::Message("Already at the last block.".to_string())
        );
    }

    #[test]
    fn test_history_is_bounded() {
        let mut nav = Navigator::new(sample_index());
        for _ in 0..8 {
            nav.execute("j");
            nav.execute("k");
        }
        // Sixteen moves were recorded; only the newest ten remain.
        assert_eq!(nav.history().len(), MAX_HISTORY);
        assert_eq!(nav.history()[0], 0);
        assert_eq!(*nav.history().last().unwrap(), 1);
    }

    #[test]
    fn test_page_navigation_within_block() {
        let long_body: String = (0..120).map(|n| format!("line {n}\n")).collect();
        let mut nav = Navigator::new(BlockIndex::new(vec![Block::from_content(
            "Long",
            long_body,
            0,
            SourceKind::Other,
        )]));
        assert_eq!(nav.current_block().unwrap().page_count(), 3);
        assert!(nav.next_page());
        assert!(nav.next_page());
        assert!(!nav.next_page());
        assert_eq!(nav.page(), 2);
        assert!(nav.prev_page());
        assert_eq!(nav.page(), 1);
    }

    #[test]
    fn test_jump_to_bounds() {
        let mut nav = Navigator::new(sample_index());
        assert!(nav.jump_to(3));
        assert_eq!(nav.position(), 3);
        assert!(!nav.jump_to(9));
        assert_eq!(nav.position(), 3);
    }

    #[test]
    fn test_sync_clamps_after_shrink() {
        let mut nav = Navigator::new(sample_index());
        nav.jump_to(3);
        nav.index_mut().rebuild(vec![Block::from_content(
            "Only",
            "body",
            0,
            SourceKind::Other,
        )]);
        nav.sync();
        assert_eq!(nav.position(), 0);
        assert_eq!(nav.page(), 0);
    }
}
