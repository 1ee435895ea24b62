//! Markdown rendering for block pages.
//!
//! Drives pulldown-cmark events into styled ratatui lines. Headings drop
//! their `#` markers and carry color instead; fenced code is boxed and
//! syntax-highlighted; tables are box-drawn when they fit the terminal
//! and degrade to a label/value list when they do not.

use itertools::{Itertools, Position};
use once_cell::sync::Lazy;
use pulldown_cmark::{Alignment, CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use syntect::easy::HighlightLines;
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;
use tracing::debug;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::tui::theme::{Component, Theme};

static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);

/// Code blocks containing these are ASCII-art diagrams: a border around
/// them would clash with their own borders, so they render bare.
const BOX_DRAWING: &str = "─│┌┐└┘├┤┬┴┼═║╔╗╚╝╠╣╦╩╬╭╮╰╯";

fn syntect_style_to_ratatui(syntect_style: syntect::highlighting::Style) -> Style {
    let fg = ratatui::style::Color::Rgb(
        syntect_style.foreground.r,
        syntect_style.foreground.g,
        syntect_style.foreground.b,
    );
    Style::default().fg(fg)
}

/// A rendered line plus how it may be reflowed.
#[derive(Debug, Clone)]
struct MarkedLine {
    line: Line<'static>,
    /// Pre-formatted content (code boxes, table borders) that wrapping
    /// would destroy.
    no_wrap: bool,
    /// Columns of indent for continuation lines when this one wraps.
    indent_level: usize,
}

impl MarkedLine {
    fn new(line: Line<'static>) -> Self {
        Self {
            line,
            no_wrap: false,
            indent_level: 0,
        }
    }

    fn new_no_wrap(line: Line<'static>) -> Self {
        Self {
            line,
            no_wrap: true,
            indent_level: 0,
        }
    }
}

/// Render markdown to lines wrapped to `width` columns.
pub fn render_markdown(input: &str, width: u16, theme: &Theme) -> Vec<Line<'static>> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    let parser = Parser::new_ext(input, options);
    let mut writer = TextWriter::new(parser, theme, width);
    writer.run();

    let max = width as usize;
    let mut out = Vec::with_capacity(writer.lines.len());
    for marked in writer.lines {
        if marked.no_wrap || marked.line.width() <= max {
            out.push(marked.line);
        } else {
            out.extend(wrap_styled_line(marked.line, max, marked.indent_level));
        }
    }
    out
}

/// Greedy word wrap over styled spans. Continuation lines are indented by
/// `indent` columns so wrapped list items align under their text.
pub(crate) fn wrap_styled_line(
    line: Line<'static>,
    width: usize,
    indent: usize,
) -> Vec<Line<'static>> {
    let width = width.max(1);
    let indent = indent.min(width.saturating_sub(1));
    let pad = " ".repeat(indent);

    let mut out: Vec<Line<'static>> = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    let mut current_width = 0usize;
    let mut has_content = false;

    for span in line.spans {
        let style = span.style;
        for chunk in split_chunks(&span.content) {
            let trimmed_width = chunk.trim_end().width();
            if has_content && current_width + trimmed_width > width {
                out.push(Line::from(std::mem::take(&mut current)));
                current_width = 0;
                has_content = false;
                if indent > 0 {
                    current.push(Span::raw(pad.clone()));
                    current_width = indent;
                }
                if chunk.trim().is_empty() {
                    continue;
                }
            }
            current_width += chunk.width();
            current.push(Span::styled(chunk.to_string(), style));
            has_content = true;
        }
    }
    if has_content || out.is_empty() {
        out.push(Line::from(current));
    }
    out
}

/// Split into word-plus-trailing-whitespace chunks: "aa  bb" -> ["aa  ", "bb"].
fn split_chunks(text: &str) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut prev_space = false;
    for (i, ch) in text.char_indices() {
        if prev_space && !ch.is_whitespace() {
            chunks.push(&text[start..i]);
            start = i;
        }
        prev_space = ch.is_whitespace();
    }
    if start < text.len() {
        chunks.push(&text[start..]);
    }
    chunks
}

/// Raw fenced-code content captured until the closing fence.
struct CodeCapture {
    language: Option<String>,
    text: String,
}

struct TextWriter<'a, I> {
    iter: I,
    lines: Vec<MarkedLine>,

    /// Stack of inline styles; the top is the current style.
    inline_styles: Vec<Style>,
    /// Prefix spans added to the start of each new line (blockquotes).
    line_prefixes: Vec<Span<'a>>,
    /// Stack of whole-line styles.
    line_styles: Vec<Style>,
    /// Current list nesting as a stack of ordered-list indices.
    list_indices: Vec<Option<u64>>,

    needs_newline: bool,
    /// A list item has opened but its marker is not yet emitted.
    in_list_item_start: bool,
    /// Columns occupied by the current item's marker, for wrap alignment.
    list_item_indent: usize,

    code: Option<CodeCapture>,

    table_alignments: Vec<Alignment>,
    /// Rows of cells, each cell a vec of spans.
    table_rows: Vec<Vec<Vec<Span<'a>>>>,

    theme: &'a Theme,
    terminal_width: u16,
}

impl<'a, I> TextWriter<'a, I>
where
    I: Iterator<Item = Event<'a>>,
{
    fn new(iter: I, theme: &'a Theme, terminal_width: u16) -> Self {
        Self {
            iter,
            lines: Vec::new(),
            inline_styles: vec![],
            line_prefixes: vec![],
            line_styles: vec![],
            list_indices: vec![],
            needs_newline: false,
            in_list_item_start: false,
            list_item_indent: 0,
            code: None,
            table_alignments: Vec::new(),
            table_rows: Vec::new(),
            theme,
            terminal_width,
        }
    }

    fn run(&mut self) {
        while let Some(event) = self.iter.next() {
            self.handle_event(event);
        }
    }

    fn handle_event(&mut self, event: Event<'a>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(text),
            Event::Code(code) => self.code_span(code),
            Event::Html(html) => {
                debug!("rendering html verbatim: {}", html);
                self.text(html)
            }
            Event::FootnoteReference(reference) => self.text(reference),
            Event::SoftBreak => self.soft_break(),
            Event::HardBreak => self.hard_break(),
            Event::Rule => self.rule(),
            Event::TaskListMarker(checked) => self.task_list_marker(checked),
        }
    }

    fn start_tag(&mut self, tag: Tag<'a>) {
        match tag {
            Tag::Paragraph => self.start_paragraph(),
            Tag::Heading(level, _, _) => self.start_heading(level),
            Tag::BlockQuote => self.start_blockquote(),
            Tag::CodeBlock(kind) => self.start_codeblock(kind),
            Tag::List(start_index) => self.start_list(start_index),
            Tag::Item => self.start_item(),
            Tag::FootnoteDefinition(_) => {}
            Tag::Table(alignments) => self.start_table(alignments),
            Tag::TableHead | Tag::TableRow => self.table_rows.push(Vec::new()),
            Tag::TableCell => {
                if let Some(row) = self.table_rows.last_mut() {
                    row.push(Vec::new());
                }
            }
            Tag::Emphasis | Tag::Strong | Tag::Strikethrough | Tag::Link(..) => {
                if self.in_list_item_start {
                    self.push_list_marker();
                    self.in_list_item_start = false;
                }
                let style = match tag {
                    Tag::Emphasis => self.theme.style(Component::Emphasis),
                    Tag::Strong => self.theme.style(Component::Strong),
                    Tag::Strikethrough => Style::default().add_modifier(Modifier::CROSSED_OUT),
                    // Link text renders in link color; the URL itself stays
                    // hidden, like a browser.
                    Tag::Link(..) => self.theme.style(Component::Link),
                    _ => unreachable!(),
                };
                self.push_inline_style(style);
            }
            Tag::Image(_link_type, dest_url, _title) => {
                debug!("image not rendered: {}", dest_url);
            }
        }
    }

    fn end_tag(&mut self, tag: Tag<'a>) {
        match tag {
            Tag::Paragraph => self.needs_newline = true,
            Tag::Heading(..) => {
                self.pop_inline_style();
                self.needs_newline = true;
            }
            Tag::BlockQuote => self.end_blockquote(),
            Tag::CodeBlock(_) => self.end_codeblock(),
            Tag::List(_) => {
                self.list_indices.pop();
                self.needs_newline = true;
            }
            Tag::Item => {
                // Empty list items never saw text; emit the bare marker.
                if self.in_list_item_start {
                    self.push_list_marker();
                    self.in_list_item_start = false;
                }
            }
            Tag::FootnoteDefinition(_) => {}
            Tag::Table(_) => self.end_table(),
            Tag::TableHead | Tag::TableRow | Tag::TableCell => {}
            Tag::Emphasis | Tag::Strong | Tag::Strikethrough | Tag::Link(..) => {
                self.pop_inline_style()
            }
            Tag::Image(..) => {}
        }
    }

    fn start_paragraph(&mut self) {
        if self.needs_newline {
            self.push_line(Line::default());
        }
        self.push_line(Line::default());
        self.needs_newline = false;
    }

    fn start_heading(&mut self, level: HeadingLevel) {
        if self.needs_newline {
            self.push_line(Line::default());
        }
        // Three visual levels; deeper headings share the H3 look.
        let style = match level {
            HeadingLevel::H1 => self.theme.style(Component::HeadingH1),
            HeadingLevel::H2 => self.theme.style(Component::HeadingH2),
            _ => self.theme.style(Component::HeadingH3),
        };
        self.push_inline_style(style);
        self.push_line(Line::default());
        self.needs_newline = false;
    }

    fn start_blockquote(&mut self) {
        if self.needs_newline {
            self.push_line(Line::default());
            self.needs_newline = false;
        }
        let style = self.theme.style(Component::BlockQuote);
        self.line_prefixes.push(Span::styled("> ", style));
        self.line_styles.push(style);
    }

    fn end_blockquote(&mut self) {
        self.line_prefixes.pop();
        self.line_styles.pop();
        self.needs_newline = true;
    }

    fn text(&mut self, text: CowStr<'a>) {
        if let Some(capture) = self.code.as_mut() {
            capture.text.push_str(text.as_ref());
            return;
        }

        if self.in_list_item_start {
            self.push_list_marker();
            self.in_list_item_start = false;
        }

        if self.in_table_cell() {
            let style = self.inline_styles.last().copied().unwrap_or_default();
            self.push_span(Span::styled(text.to_string(), style));
            return;
        }

        for (position, line) in text.lines().with_position() {
            if self.needs_newline {
                self.push_line(Line::default());
                self.needs_newline = false;
            }
            if matches!(position, Position::Middle | Position::Last) {
                self.push_line(Line::default());
            }
            let style = self.inline_styles.last().copied().unwrap_or_default();
            self.push_span(Span::styled(line.to_owned(), style));
        }
        self.needs_newline = false;
    }

    fn code_span(&mut self, code: CowStr<'a>) {
        if self.in_list_item_start {
            self.push_list_marker();
            self.in_list_item_start = false;
        }
        let style = self.theme.style(Component::InlineCode);
        self.push_span(Span::styled(code, style));
    }

    fn soft_break(&mut self) {
        self.push_line(Line::default());
    }

    fn hard_break(&mut self) {
        self.push_line(Line::default());
    }

    fn rule(&mut self) {
        if self.needs_newline {
            self.push_line(Line::default());
        }
        let rule = "─".repeat(self.terminal_width as usize);
        let style = self.theme.style(Component::DimText);
        self.push_no_wrap(Line::from(Span::styled(rule, style)));
        self.needs_newline = true;
    }

    fn task_list_marker(&mut self, checked: bool) {
        let marker = if checked { "[x] " } else { "[ ] " };
        self.push_span(Span::raw(marker));
    }

    fn start_list(&mut self, index: Option<u64>) {
        if self.list_indices.is_empty() && self.needs_newline {
            self.push_line(Line::default());
        }
        self.list_indices.push(index);
    }

    fn start_item(&mut self) {
        self.push_line(Line::default());
        self.in_list_item_start = true;
        self.list_item_indent = 0;
        self.needs_newline = false;
    }

    /// Emit the marker for the current item: top-level bullets are
    /// cyan behind a two-space indent, nested bullets gray behind four,
    /// ordered items a yellow number.
    fn push_list_marker(&mut self) {
        if self.list_indices.is_empty() {
            return;
        }
        let nested = self.list_indices.len() >= 2;

        let (marker, style) = match self.list_indices.last_mut() {
            Some(Some(index)) => {
                *index += 1;
                (
                    format!("  {}. ", *index - 1),
                    self.theme.style(Component::ListNumber),
                )
            }
            _ if nested => (
                "    - ".to_string(),
                self.theme.style(Component::ListBulletNested),
            ),
            _ => ("  - ".to_string(), self.theme.style(Component::ListBullet)),
        };

        self.list_item_indent = marker.width();
        if let Some(current) = self.lines.last_mut() {
            current.indent_level = self.list_item_indent;
        }
        self.push_span(Span::styled(marker, style));
    }

    fn start_codeblock(&mut self, kind: CodeBlockKind<'_>) {
        if !self.lines.is_empty() {
            self.push_line(Line::default());
        }
        let language = match kind {
            CodeBlockKind::Fenced(lang) if !lang.as_ref().is_empty() => {
                Some(lang.as_ref().to_string())
            }
            _ => None,
        };
        self.code = Some(CodeCapture {
            language,
            text: String::new(),
        });
        self.needs_newline = false;
    }

    fn end_codeblock(&mut self) {
        let Some(capture) = self.code.take() else {
            return;
        };
        let lines: Vec<&str> = capture.text.lines().collect();
        if !lines.is_empty() {
            if lines.iter().any(|l| l.chars().any(|c| BOX_DRAWING.contains(c))) {
                self.render_code_bare(&lines, capture.language.as_deref());
            } else {
                self.render_code_boxed(&lines, capture.language.as_deref());
            }
        }
        self.needs_newline = true;
    }

    /// ASCII-art diagrams: gray, four-space indent, no border and no
    /// truncation.
    fn render_code_bare(&mut self, lines: &[&str], language: Option<&str>) {
        let style = self.theme.style(Component::CodeBlock);
        if let Some(lang) = language {
            self.push_no_wrap(Line::from(Span::styled(lang.to_string(), style)));
        }
        for line in lines {
            self.push_no_wrap(Line::from(Span::styled(format!("    {line}"), style)));
        }
    }

    /// Regular code: a gray box sized to the longest line, the language as
    /// a label in the top border, content highlighted when a syntax and
    /// theme are available.
    fn render_code_boxed(&mut self, lines: &[&str], language: Option<&str>) {
        let border = self.theme.style(Component::CodeBlock);
        let max_line = lines.iter().map(|l| l.width()).max().unwrap_or(0);
        let code_width = max_line.min((self.terminal_width as usize).saturating_sub(4));

        let mut top = String::from("┌");
        let label = language.map(|lang| format!(" {lang} "));
        match label {
            Some(label) if label.width() <= code_width => {
                let fill = code_width + 2 - label.width();
                top.push_str(&label);
                top.push_str(&"─".repeat(fill));
            }
            _ => top.push_str(&"─".repeat(code_width + 2)),
        }
        top.push('┐');
        self.push_no_wrap(Line::from(Span::styled(top, border)));

        let highlighted = highlight_lines(lines, language, self.theme, border);
        for spans in highlighted {
            let (mut spans, used) = truncate_spans(spans, code_width);
            let mut full = vec![Span::styled("│ ", border)];
            full.append(&mut spans);
            if used < code_width {
                full.push(Span::raw(" ".repeat(code_width - used)));
            }
            full.push(Span::styled(" │", border));
            self.push_no_wrap(Line::from(full));
        }

        let bottom = format!("└{}┘", "─".repeat(code_width + 2));
        self.push_no_wrap(Line::from(Span::styled(bottom, border)));
    }

    fn start_table(&mut self, alignments: Vec<Alignment>) {
        if self.needs_newline {
            self.push_line(Line::default());
        }
        self.table_alignments = alignments;
        self.table_rows.clear();
        self.needs_newline = false;
    }

    fn end_table(&mut self) {
        self.render_table();
        self.table_alignments.clear();
        self.table_rows.clear();
        self.needs_newline = true;
    }

    fn in_table_cell(&self) -> bool {
        self.table_rows
            .last()
            .is_some_and(|row| !row.is_empty())
    }

    /// Box-drawn table when it fits the terminal; otherwise each data row
    /// becomes a `label: value` group.
    fn render_table(&mut self) {
        let rows = std::mem::take(&mut self.table_rows);
        if rows.is_empty() {
            return;
        }

        let num_cols = self.table_alignments.len();
        let mut col_widths = vec![0usize; num_cols];
        for row in &rows {
            for (idx, cell) in row.iter().enumerate() {
                if idx < num_cols {
                    let width = cell.iter().map(|s| s.content.as_ref().width()).sum();
                    col_widths[idx] = col_widths[idx].max(width);
                }
            }
        }
        for width in &mut col_widths {
            *width += 2;
        }

        let total_width = 1 + col_widths.iter().map(|w| w + 1).sum::<usize>();
        if total_width > self.terminal_width as usize {
            self.render_table_as_list(&rows);
            return;
        }

        let border_style = self.theme.style(Component::TableBorder);
        let header_style = self.theme.style(Component::TableHeader);

        self.push_table_border(&col_widths, '┌', '┬', '┐', border_style);
        for (row_idx, row) in rows.iter().enumerate() {
            let is_header = row_idx == 0 && rows.len() > 1;
            let mut spans = vec![Span::styled("│", border_style)];
            for (idx, cell) in row.iter().enumerate() {
                if idx < num_cols {
                    let text = cell_text(cell);
                    let padded = align_text(&text, col_widths[idx], self.table_alignments[idx]);
                    let style = if is_header {
                        header_style
                    } else {
                        Style::default()
                    };
                    spans.push(Span::styled(padded, style));
                    spans.push(Span::styled("│", border_style));
                }
            }
            self.push_no_wrap(Line::from(spans));
            if is_header {
                self.push_table_border(&col_widths, '├', '┼', '┤', border_style);
            }
        }
        self.push_table_border(&col_widths, '└', '┴', '┘', border_style);
    }

    /// Fallback for over-wide tables: the first column header labels each
    /// row, remaining cells become indented key/value lines.
    fn render_table_as_list(&mut self, rows: &[Vec<Vec<Span<'a>>>]) {
        let headers: Vec<String> = rows[0].iter().map(|c| cell_text(c)).collect();
        let label = match headers.first() {
            Some(h) if !h.is_empty() => h.clone(),
            _ => "Item".to_string(),
        };
        let label_style = self.theme.style(Component::ListBullet);

        for row in &rows[1..] {
            let mut first = cell_text(row.first().map_or(&[][..], |c| c));
            if first.is_empty() {
                first = "(empty)".to_string();
            }
            self.push_line(Line::from(vec![
                Span::styled(format!("{label}:"), label_style),
                Span::raw(format!(" {first}")),
            ]));
            for (idx, cell) in row.iter().enumerate().skip(1) {
                if idx < headers.len() {
                    let text = cell_text(cell);
                    if !text.is_empty() {
                        self.push_line(Line::from(format!("    {}: {text}", headers[idx])));
                    }
                }
            }
            self.push_line(Line::default());
        }
    }

    fn push_table_border(
        &mut self,
        col_widths: &[usize],
        left: char,
        mid: char,
        right: char,
        style: Style,
    ) {
        let mut border = String::from(left);
        for (idx, &width) in col_widths.iter().enumerate() {
            border.push_str(&"─".repeat(width));
            if idx < col_widths.len() - 1 {
                border.push(mid);
            }
        }
        border.push(right);
        self.push_no_wrap(Line::from(Span::styled(border, style)));
    }

    fn push_inline_style(&mut self, style: Style) {
        let current = self.inline_styles.last().copied().unwrap_or_default();
        self.inline_styles.push(current.patch(style));
    }

    fn pop_inline_style(&mut self) {
        self.inline_styles.pop();
    }

    fn push_line(&mut self, line: Line<'a>) {
        let style = self.line_styles.last().copied().unwrap_or_default();
        let mut line = line.patch_style(style);

        for prefix in self.line_prefixes.iter().rev() {
            line.spans.insert(0, prefix.clone());
        }

        let spans: Vec<Span<'static>> = line
            .spans
            .into_iter()
            .map(|span| Span::styled(span.content.into_owned(), span.style))
            .collect();

        let mut marked = MarkedLine::new(Line::from(spans));
        if !self.list_indices.is_empty() && self.line_prefixes.is_empty() {
            marked.indent_level = self.list_item_indent;
        }
        self.lines.push(marked);
    }

    fn push_no_wrap(&mut self, line: Line<'static>) {
        self.lines.push(MarkedLine::new_no_wrap(line));
    }

    fn push_span(&mut self, span: Span<'a>) {
        if self.in_table_cell() {
            if let Some(cell) = self
                .table_rows
                .last_mut()
                .and_then(|row| row.last_mut())
            {
                cell.push(span);
            }
        } else if let Some(marked) = self.lines.last_mut() {
            let span = Span::styled(span.content.into_owned(), span.style);
            marked.line.push_span(span);
        } else {
            self.push_line(Line::from(vec![span]));
        }
    }
}

fn cell_text(cell: &[Span<'_>]) -> String {
    cell.iter().map(|s| s.content.as_ref()).collect()
}

/// Pad `text` into `width` columns honoring the column alignment. The
/// width already includes one column of padding on each side.
fn align_text(text: &str, width: usize, alignment: Alignment) -> String {
    let total_padding = width.saturating_sub(text.width());
    match alignment {
        Alignment::None | Alignment::Left => {
            let right = total_padding.saturating_sub(1);
            format!(" {}{}", text, " ".repeat(right))
        }
        Alignment::Center => {
            let left = total_padding / 2;
            format!(
                "{}{}{}",
                " ".repeat(left),
                text,
                " ".repeat(total_padding - left)
            )
        }
        Alignment::Right => {
            let left = total_padding.saturating_sub(1);
            format!("{}{} ", " ".repeat(left), text)
        }
    }
}

/// Highlight code lines with syntect when a language and syntax theme are
/// available; otherwise style them with the plain code-block color.
fn highlight_lines(
    lines: &[&str],
    language: Option<&str>,
    theme: &Theme,
    plain: Style,
) -> Vec<Vec<Span<'static>>> {
    let (Some(lang), Some(syntax_theme)) = (language, theme.syntax_theme.as_ref()) else {
        return lines
            .iter()
            .map(|line| vec![Span::styled(line.to_string(), plain)])
            .collect();
    };

    let syntax = SYNTAX_SET
        .find_syntax_by_token(lang)
        .or_else(|| SYNTAX_SET.find_syntax_by_extension(lang))
        .unwrap_or_else(|| SYNTAX_SET.find_syntax_plain_text());
    let mut highlighter = HighlightLines::new(syntax, syntax_theme);

    let joined = format!("{}\n", lines.join("\n"));
    let mut out = Vec::with_capacity(lines.len());
    for line in LinesWithEndings::from(&joined) {
        let highlighted = highlighter
            .highlight_line(line, &SYNTAX_SET)
            .unwrap_or_else(|_| vec![(syntect::highlighting::Style::default(), line)]);
        let spans: Vec<Span<'static>> = highlighted
            .into_iter()
            .map(|(style, text)| {
                Span::styled(
                    text.trim_end_matches('\n').to_string(),
                    syntect_style_to_ratatui(style),
                )
            })
            .filter(|span| !span.content.is_empty())
            .collect();
        out.push(spans);
    }
    out
}

/// Cut styled spans at `max_cols` display columns; returns the kept spans
/// and the columns they occupy.
fn truncate_spans(spans: Vec<Span<'static>>, max_cols: usize) -> (Vec<Span<'static>>, usize) {
    let mut out = Vec::new();
    let mut used = 0usize;
    for span in spans {
        let width = span.content.as_ref().width();
        if used + width <= max_cols {
            used += width;
            out.push(span);
            continue;
        }
        let mut taken = String::new();
        for ch in span.content.chars() {
            let cw = ch.width().unwrap_or(0);
            if used + cw > max_cols {
                break;
            }
            used += cw;
            taken.push(ch);
        }
        if !taken.is_empty() {
            out.push(Span::styled(taken, span.style));
        }
        break;
    }
    (out, used)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    fn plain_theme() -> Theme {
        Theme { syntax_theme: None }
    }

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_heading_markers_are_stripped() {
        let theme = plain_theme();
        let lines = render_markdown("# Title", 80, &theme);
        assert_eq!(line_text(&lines[0]), "Title");
        assert_eq!(lines[0].spans[0].style.fg, Some(Color::Yellow));
    }

    #[test]
    fn test_heading_levels_have_distinct_colors() {
        let theme = plain_theme();
        let h2 = render_markdown("## Sub", 80, &theme);
        let h3 = render_markdown("### Deep", 80, &theme);
        assert_eq!(h2[0].spans[0].style.fg, Some(Color::Rgb(0x87, 0xce, 0xeb)));
        assert_eq!(h3[0].spans[0].style.fg, Some(Color::Rgb(0x80, 0x80, 0x80)));
    }

    #[test]
    fn test_top_level_bullet_indent_and_color() {
        let theme = plain_theme();
        let lines = render_markdown("- one", 80, &theme);
        assert_eq!(line_text(&lines[0]), "  - one");
        assert_eq!(lines[0].spans[0].style.fg, Some(Color::Cyan));
    }

    #[test]
    fn test_nested_bullet_is_gray_and_deeper() {
        let theme = plain_theme();
        let lines = render_markdown("- outer\n  - inner", 80, &theme);
        assert_eq!(line_text(&lines[0]), "  - outer");
        assert_eq!(line_text(&lines[1]), "    - inner");
        assert_eq!(
            lines[1].spans[0].style.fg,
            Some(Color::Rgb(0x80, 0x80, 0x80))
        );
    }

    #[test]
    fn test_numbered_list() {
        let theme = plain_theme();
        let lines = render_markdown("1. first\n2. second", 80, &theme);
        assert_eq!(line_text(&lines[0]), "  1. first");
        assert_eq!(line_text(&lines[1]), "  2. second");
        assert_eq!(lines[0].spans[0].style.fg, Some(Color::Yellow));
    }

    #[test]
    fn test_link_url_is_hidden() {
        let theme = plain_theme();
        let lines = render_markdown("see [docs](https://example.com) here", 80, &theme);
        let text = line_text(&lines[0]);
        assert!(text.contains("docs"));
        assert!(!text.contains("example.com"));
        let link_span = lines[0]
            .spans
            .iter()
            .find(|s| s.content.as_ref() == "docs")
            .unwrap();
        assert_eq!(link_span.style.fg, Some(Color::Blue));
    }

    #[test]
    fn test_bold_is_gold() {
        let theme = plain_theme();
        let lines = render_markdown("**hi**", 80, &theme);
        let span = &lines[0].spans[0];
        assert_eq!(span.content.as_ref(), "hi");
        assert_eq!(span.style.fg, Some(Color::Rgb(0xff, 0xd7, 0x00)));
        assert!(span.style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_inline_code_style() {
        let theme = plain_theme();
        let lines = render_markdown("run `cargo` now", 80, &theme);
        let code = lines[0]
            .spans
            .iter()
            .find(|s| s.content.as_ref() == "cargo")
            .unwrap();
        assert_eq!(code.style.fg, Some(Color::Rgb(0xa0, 0xa0, 0xa0)));
    }

    #[test]
    fn test_code_block_is_boxed() {
        let theme = plain_theme();
        let lines = render_markdown("```\nhi\n```", 80, &theme);
        let texts: Vec<String> = lines.iter().map(line_text).collect();
        assert_eq!(texts, vec!["┌────┐", "│ hi │", "└────┘"]);
    }

    #[test]
    fn test_code_block_language_label() {
        let theme = plain_theme();
        let lines = render_markdown("```rust\nfn main() {}\n```", 80, &theme);
        assert!(line_text(&lines[0]).starts_with("┌ rust ─"));
        assert!(line_text(&lines[1]).starts_with("│ fn main() {}"));
    }

    #[test]
    fn test_long_code_lines_are_truncated_to_box() {
        let theme = plain_theme();
        let long = "x".repeat(100);
        let input = format!("```\n{long}\n```");
        let lines = render_markdown(&input, 40, &theme);
        // Box inner width is terminal width minus the border columns.
        for line in &lines {
            assert!(line.width() <= 40);
        }
        assert!(line_text(&lines[1]).starts_with("│ xxx"));
    }

    #[test]
    fn test_ascii_art_code_renders_without_border() {
        let theme = plain_theme();
        let lines = render_markdown("```\n┌─┐\n```", 80, &theme);
        assert_eq!(line_text(&lines[0]), "    ┌─┐");
    }

    #[test]
    fn test_table_renders_boxed_when_it_fits() {
        let theme = plain_theme();
        let lines = render_markdown("| a | b |\n|---|---|\n| 1 | 2 |", 80, &theme);
        let texts: Vec<String> = lines.iter().map(line_text).collect();
        assert!(texts[0].starts_with('┌'));
        assert!(texts[1].contains(" a "));
        assert!(texts[2].starts_with('├'));
        assert!(texts[3].contains(" 1 "));
        assert!(texts[4].starts_with('└'));
    }

    #[test]
    fn test_wide_table_falls_back_to_list() {
        let theme = plain_theme();
        let input = "| Name | Description |\n|---|---|\n| alpha | a rather long description cell |";
        let lines = render_markdown(input, 20, &theme);
        let texts: Vec<String> = lines.iter().map(line_text).collect();
        assert!(texts.iter().any(|t| t.starts_with("Name: alpha")));
        assert!(texts.iter().any(|t| t.contains("Description:")));
        assert!(!texts.iter().any(|t| t.contains('│')));
    }

    #[test]
    fn test_list_item_wrap_alignment() {
        let theme = plain_theme();
        let lines = render_markdown("- aaaa bbbb cccc dddd eeee ffff gggg", 10, &theme);
        let texts: Vec<String> = lines.iter().map(line_text).collect();
        assert_eq!(
            texts,
            vec![
                "  - aaaa ",
                "    bbbb ",
                "    cccc ",
                "    dddd ",
                "    eeee ",
                "    ffff ",
                "    gggg",
            ]
        );
    }

    #[test]
    fn test_blockquote_prefix() {
        let theme = plain_theme();
        let lines = render_markdown("> quoted words", 80, &theme);
        assert!(line_text(&lines[0]).starts_with("> "));
    }

    #[test]
    fn test_paragraphs_are_separated_by_blank_lines() {
        let theme = plain_theme();
        let lines = render_markdown("first\n\nsecond", 80, &theme);
        let texts: Vec<String> = lines.iter().map(line_text).collect();
        assert_eq!(texts, vec!["first", "", "second"]);
    }

    #[test]
    fn test_syntax_highlighting_produces_multiple_spans() {
        let theme = Theme::default();
        let lines = render_markdown("```rust\nlet x = 42;\n```", 80, &theme);
        // Border, code line, border. The code line should carry more than
        // one colored span once highlighting ran.
        assert!(lines[1].spans.len() > 3);
    }
}
