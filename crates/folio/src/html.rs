//! HTML rendering for `--serve`. One self-contained document: a TOC
//! sidebar scanned from headings, an article per block, markdown pages
//! through pulldown-cmark, diff pages as classed `<pre>` hunks, and a
//! script that reloads the page on SSE notifications from `/events`.

use folio_core::block::{Block, Page};
use folio_core::diff::{DiffLineKind, parse_hunks};
use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag};

/// Render blocks as a complete HTML document.
pub fn render_page(title: &str, blocks: &[Block], show_line_numbers: bool) -> String {
    let headings = collect_headings(blocks);
    let mut out = String::with_capacity(16 * 1024);

    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    out.push_str("<meta charset=\"UTF-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    out.push_str(&format!("<title>{}</title>\n", escape(title)));
    out.push_str("<style>\n");
    out.push_str(CSS);
    out.push_str("</style>\n</head>\n<body>\n");

    // A sidebar is only worth the space once there is something to jump
    // between.
    if headings.len() > 1 {
        render_toc(title, &headings, &mut out);
        out.push_str("<main class=\"container has-toc\">\n");
    } else {
        out.push_str("<main class=\"container\">\n");
    }

    for block in blocks {
        render_block(block, show_line_numbers, &mut out);
    }

    out.push_str("</main>\n<script>\n");
    out.push_str(RELOAD_SCRIPT);
    out.push_str("</script>\n</body>\n</html>\n");
    out
}

struct TocEntry {
    level: u8,
    text: String,
    id: String,
}

/// Scan all `Lines` pages for `#`, `##` and `###` headings, in document
/// order.
fn collect_headings(blocks: &[Block]) -> Vec<TocEntry> {
    let mut out = Vec::new();
    for block in blocks {
        for page in &block.pages {
            let Page::Lines(content) = page else { continue };
            for line in content.lines() {
                let trimmed = line.trim();
                let (level, text) = if let Some(rest) = trimmed.strip_prefix("### ") {
                    (3, rest)
                } else if let Some(rest) = trimmed.strip_prefix("## ") {
                    (2, rest)
                } else if let Some(rest) = trimmed.strip_prefix("# ") {
                    (1, rest)
                } else {
                    continue;
                };
                out.push(TocEntry {
                    level,
                    text: text.to_string(),
                    id: heading_id(text),
                });
            }
        }
    }
    out
}

/// URL-safe anchor for a heading: markdown markers stripped, lowercased,
/// runs of non-alphanumerics collapsed to single dashes.
fn heading_id(text: &str) -> String {
    let mut id = String::with_capacity(text.len());
    let mut last_dash = true;
    for c in text.chars() {
        if matches!(c, '*' | '_' | '`' | '[' | ']' | '(' | ')') {
            continue;
        }
        let c = c.to_ascii_lowercase();
        if c.is_ascii_alphanumeric() {
            id.push(c);
            last_dash = false;
        } else if !last_dash {
            id.push('-');
            last_dash = true;
        }
    }
    let id = id.trim_end_matches('-');
    if id.is_empty() {
        "section".to_string()
    } else {
        id.to_string()
    }
}

fn render_toc(title: &str, headings: &[TocEntry], out: &mut String) {
    out.push_str("<nav class=\"toc\">\n");
    out.push_str(&format!(
        "<div class=\"toc-title\">{}</div>\n",
        escape(title)
    ));
    for h in headings {
        out.push_str(&format!(
            "<a class=\"toc-link toc-h{}\" href=\"#{}\">{}</a>\n",
            h.level,
            h.id,
            escape(&h.text)
        ));
    }
    out.push_str("</nav>\n");
}

fn render_block(block: &Block, show_line_numbers: bool, out: &mut String) {
    out.push_str("<article class=\"block\">\n");
    out.push_str(&format!(
        "<header class=\"block-header\">{}",
        escape(&block.name)
    ));
    if show_line_numbers && block.origin_line > 0 {
        out.push_str(&format!(
            " <span class=\"origin\">L{}</span>",
            block.origin_line
        ));
    }
    out.push_str("</header>\n");

    for page in &block.pages {
        match page {
            Page::Hunk { diff, hunk } => render_hunk_html(diff, *hunk, out),
            Page::Lines(content) => {
                out.push_str("<div class=\"content\">\n");
                out.push_str(&markdown_html(content));
                out.push_str("</div>\n");
            }
        }
    }
    out.push_str("</article>\n");
}

/// Markdown to HTML with heading events rewritten so every heading
/// carries the same anchor id the TOC links to. Inline markup inside a
/// heading is flattened to its text. Raw HTML in the source is shown
/// literally rather than injected into the page.
fn markdown_html(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_TASKLISTS;
    let parser = Parser::new_ext(markdown, options);

    let mut events: Vec<Event> = Vec::new();
    let mut heading: Option<(HeadingLevel, String)> = None;

    for event in parser {
        match event {
            Event::Start(Tag::Heading(level, _, _)) => heading = Some((level, String::new())),
            Event::End(Tag::Heading(..)) => {
                if let Some((level, text)) = heading.take() {
                    let id = heading_id(&text);
                    events.push(Event::Html(
                        format!(
                            "<{level} id=\"{id}\"><a class=\"anchor\" href=\"#{id}\">#</a>{}</{level}>\n",
                            escape(&text)
                        )
                        .into(),
                    ));
                }
            }
            Event::Text(text) => match heading.as_mut() {
                Some((_, buf)) => buf.push_str(&text),
                None => events.push(Event::Text(text)),
            },
            Event::Code(code) => match heading.as_mut() {
                Some((_, buf)) => buf.push_str(&code),
                None => events.push(Event::Code(code)),
            },
            Event::Html(html) => match heading.as_mut() {
                Some((_, buf)) => buf.push_str(&html),
                None => events.push(Event::Text(html)),
            },
            other => {
                if heading.is_none() {
                    events.push(other);
                }
            }
        }
    }

    let mut html = String::new();
    pulldown_cmark::html::push_html(&mut html, events.into_iter());
    html
}

/// One hunk as a classed `<pre>`: a header with the hunk number, +/-
/// counts and the `@@` range, then add/remove/context lines.
fn render_hunk_html(diff: &str, hunk_index: usize, out: &mut String) {
    let hunks = parse_hunks(diff);
    if hunks.is_empty() {
        // Not a parseable diff; show it as-is.
        out.push_str("<pre class=\"diff\">");
        out.push_str(&escape(diff));
        out.push_str("</pre>\n");
        return;
    }
    let hunk = &hunks[hunk_index.min(hunks.len() - 1)];

    out.push_str("<div class=\"diff-hunk\">\n<div class=\"diff-hunk-header\">");
    out.push_str(&format!(
        "Hunk {} <span class=\"stat-add\">+{}</span> <span class=\"stat-del\">-{}</span>",
        hunk_index + 1,
        hunk.added_count(),
        hunk.removed_count()
    ));
    if !hunk.header.is_empty() {
        out.push_str(&format!(
            " <span class=\"diff-hunk-range\">{}</span>",
            escape(&hunk.header)
        ));
    }
    out.push_str("</div>\n<pre class=\"diff\">");
    for line in &hunk.lines {
        let (class, sign) = match line.kind {
            DiffLineKind::Added => ("diff-add", '+'),
            DiffLineKind::Removed => ("diff-del", '-'),
            DiffLineKind::Context => ("diff-ctx", ' '),
        };
        out.push_str(&format!("<span class=\"{class}\">{sign}"));
        out.push_str(&escape(&line.content));
        out.push_str("</span>\n");
    }
    out.push_str("</pre>\n</div>\n");
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let _ = pulldown_cmark::escape::escape_html(&mut out, text);
    out
}

const RELOAD_SCRIPT: &str = "\
var es = new EventSource('/events');
es.onmessage = function(e) { if (e.data === 'reload') location.reload(); };
es.onerror = function() { setTimeout(function() { location.reload(); }, 2000); };
";

const CSS: &str = "\
* { margin: 0; padding: 0; box-sizing: border-box; }

body {
  background: #1e1e2e;
  color: #cdd6f4;
  font-family: 'SF Mono', 'Fira Code', 'JetBrains Mono', 'Cascadia Code', monospace;
  font-size: 14px;
  line-height: 1.6;
}

.container { max-width: 900px; margin: 0 auto; padding: 2rem 1.5rem; }
.container.has-toc { margin-left: 280px; }

.toc {
  position: fixed;
  top: 0;
  left: 0;
  width: 260px;
  height: 100vh;
  background: #181825;
  border-right: 1px solid #313244;
  overflow-y: auto;
  padding: 1rem 0;
}
.toc-title {
  padding: 0.3rem 0.8rem 0.6rem;
  color: #f9e2af;
  font-size: 13px;
  font-weight: bold;
  border-bottom: 1px solid #313244;
  margin-bottom: 0.4rem;
}
.toc-link {
  display: block;
  padding: 0.2rem 0.8rem;
  color: #6c7086;
  text-decoration: none;
  font-size: 12px;
}
.toc-link:hover { color: #cdd6f4; background: #1e1e2e; }
.toc-h2 { padding-left: 1.4rem; }
.toc-h3 { padding-left: 2rem; font-size: 11px; }

.block { margin-bottom: 2rem; }
.block-header {
  background: #333333;
  color: #cdd6f4;
  padding: 0.4rem 0.8rem;
  font-size: 13px;
}
.block-header .origin { color: #555555; font-size: 11px; }

.content { padding: 0.5rem 0.8rem; }

h1 { color: #f9e2af; font-size: 1.4em; margin: 1rem 0 0.5rem; }
h2 { color: #87ceeb; font-size: 1.2em; margin: 1rem 0 0.5rem; }
h3 { color: #808080; font-size: 1.1em; margin: 0.8rem 0 0.4rem; }

.anchor {
  color: #45475a;
  text-decoration: none;
  font-size: 0.7em;
  margin-right: 0.4rem;
  opacity: 0;
}
h1:hover .anchor, h2:hover .anchor, h3:hover .anchor { opacity: 1; }

p { margin: 0.3rem 0; }
strong { color: #ffd700; }
a { color: #89b4fa; text-decoration: none; }
a:hover { text-decoration: underline; }
ul, ol { padding-left: 1.5rem; margin: 0.3rem 0; }
li::marker { color: #89dceb; }
hr { border: none; border-top: 1px solid #707070; margin: 1rem 0; }

code {
  color: #a0a0a0;
  background: #313244;
  padding: 0.1rem 0.3rem;
  border-radius: 3px;
  font-size: 0.9em;
}
pre {
  margin: 0.8rem 0;
  padding: 0.6rem 0.8rem;
  border: 1px solid #707070;
  border-radius: 4px;
  overflow-x: auto;
}
pre code { background: transparent; padding: 0; }

table { border-collapse: collapse; font-size: 0.9em; margin: 0.8rem 0; }
th, td { border: 1px solid #707070; padding: 0.3rem 0.6rem; }
th { background: #313244; color: #87ceeb; }

.diff-hunk { margin: 0.5rem 0.8rem; border: 1px solid #313244; border-radius: 4px; overflow: hidden; }
.diff-hunk-header {
  background: #313244;
  padding: 0.3rem 0.6rem;
  font-size: 12px;
  color: #6c7086;
}
.diff-hunk-range { color: #45475a; font-size: 11px; }
.stat-add { color: #a6e3a1; }
.stat-del { color: #f38ba8; }
pre.diff { margin: 0; border: none; border-radius: 0; }
.diff-add { display: block; background: rgba(45, 90, 45, 0.3); }
.diff-del { display: block; background: rgba(90, 45, 90, 0.3); }
.diff-ctx { display: block; color: #808080; }
";
