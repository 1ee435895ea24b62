//! Color theme for the viewer.
//!
//! Rendering code never hardcodes colors; it asks the [`Theme`] for the
//! style of a [`Component`]. The default palette is tuned for dark
//! terminals.

use ratatui::style::{Color, Modifier, Style};
use syntect::highlighting::ThemeSet;

/// Semantic UI components that can be styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    /// User message line in a conversation block
    UserText,
    /// Assistant prose in a conversation block
    AssistantText,
    /// De-emphasized text: page indicators, separators, hints
    DimText,
    /// Added diff line (full-width background)
    DiffAdded,
    /// Removed diff line (full-width background)
    DiffRemoved,
    /// Unchanged diff context line
    DiffContext,
    /// Filename in a diff page header
    DiffFile,
    HeadingH1,
    HeadingH2,
    HeadingH3,
    /// Inline `code` span
    InlineCode,
    /// Fenced code block border and unhighlighted code text
    CodeBlock,
    Strong,
    Emphasis,
    Link,
    /// Top-level bullet marker
    ListBullet,
    /// Nested bullet marker
    ListBulletNested,
    /// Ordered list number
    ListNumber,
    TableBorder,
    TableHeader,
    BlockQuote,
    /// Full-width block header bar (markdown sources)
    BlockHeader,
    /// The `chat` label in a conversation block header
    ChatLabel,
    /// The `shell` label in a shell block header
    ShellLabel,
    /// `Tool:` prefix on a one-line tool summary
    ToolSummary,
    /// `[?]` marker and `Qn/m` index on question lines
    Question,
}

/// Maps components to concrete styles. Holds the syntect theme used for
/// fenced code highlighting; `None` renders code without highlighting.
pub struct Theme {
    pub syntax_theme: Option<syntect::highlighting::Theme>,
}

impl Default for Theme {
    fn default() -> Self {
        let mut themes = ThemeSet::load_defaults().themes;
        Self {
            syntax_theme: themes.remove("base16-ocean.dark"),
        }
    }
}

impl Theme {
    pub fn style(&self, component: Component) -> Style {
        match component {
            Component::UserText => Style::default()
                .fg(Color::White)
                .bg(Color::Rgb(0x30, 0x30, 0x30)),
            Component::AssistantText => Style::default(),
            Component::DimText | Component::DiffContext => {
                Style::default().fg(Color::Rgb(0x80, 0x80, 0x80))
            }
            Component::DiffAdded => Style::default()
                .fg(Color::White)
                .bg(Color::Rgb(0x2d, 0x5a, 0x2d)),
            Component::DiffRemoved => Style::default()
                .fg(Color::White)
                .bg(Color::Rgb(0x5a, 0x2d, 0x5a)),
            Component::DiffFile => Style::default().fg(Color::Green),
            Component::HeadingH1 => Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            Component::HeadingH2 => Style::default()
                .fg(Color::Rgb(0x87, 0xce, 0xeb))
                .add_modifier(Modifier::BOLD),
            Component::HeadingH3 => Style::default()
                .fg(Color::Rgb(0x80, 0x80, 0x80))
                .add_modifier(Modifier::BOLD),
            Component::InlineCode => Style::default().fg(Color::Rgb(0xa0, 0xa0, 0xa0)),
            Component::CodeBlock => Style::default().fg(Color::Rgb(0x70, 0x70, 0x70)),
            Component::Strong => Style::default()
                .fg(Color::Rgb(0xff, 0xd7, 0x00))
                .add_modifier(Modifier::BOLD),
            Component::Emphasis => Style::default().add_modifier(Modifier::ITALIC),
            Component::Link => Style::default().fg(Color::Blue),
            Component::ListBullet => Style::default().fg(Color::Cyan),
            Component::ListBulletNested => Style::default().fg(Color::Rgb(0x80, 0x80, 0x80)),
            Component::ListNumber => Style::default().fg(Color::Yellow),
            Component::TableBorder => Style::default().fg(Color::Rgb(0x70, 0x70, 0x70)),
            Component::TableHeader => Style::default()
                .fg(Color::Rgb(0x87, 0xce, 0xeb))
                .add_modifier(Modifier::BOLD),
            Component::BlockQuote => Style::default()
                .fg(Color::Rgb(0x80, 0x80, 0x80))
                .add_modifier(Modifier::ITALIC),
            Component::BlockHeader => Style::default()
                .fg(Color::White)
                .bg(Color::Rgb(0x33, 0x33, 0x33)),
            Component::ChatLabel => Style::default().fg(Color::Rgb(0xb2, 0x94, 0xbb)),
            Component::ShellLabel => Style::default().fg(Color::Rgb(0x99, 0xb4, 0x94)),
            Component::ToolSummary => Style::default()
                .fg(Color::Rgb(0x17, 0x92, 0x99))
                .add_modifier(Modifier::BOLD),
            Component::Question => Style::default().fg(Color::Yellow),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_theme_has_syntax_highlighting() {
        let theme = Theme::default();
        assert!(theme.syntax_theme.is_some());
    }

    #[test]
    fn test_diff_styles_are_distinct() {
        let theme = Theme::default();
        let added = theme.style(Component::DiffAdded);
        let removed = theme.style(Component::DiffRemoved);
        let context = theme.style(Component::DiffContext);
        assert_ne!(added.bg, removed.bg);
        assert_eq!(context.bg, None);
        assert_eq!(added.fg, Some(Color::White));
    }

    #[test]
    fn test_headings_are_bold() {
        let theme = Theme::default();
        for c in [
            Component::HeadingH1,
            Component::HeadingH2,
            Component::HeadingH3,
        ] {
            assert!(theme.style(c).add_modifier.contains(Modifier::BOLD));
        }
    }
}
