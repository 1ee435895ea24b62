//! Pre-parse category selector for transcripts.
//!
//! Runs on the plain terminal before the alternate screen opens: lists
//! the categories found in the transcript, digits toggle them, Enter
//! confirms. Redraws in place with the cursor-up escape so the prompt
//! never scrolls.

use std::io::{self, BufRead, Write};

use folio_core::parser::{Category, CategoryCount, TranscriptFilters, scan_categories};

/// Prompt for category filters on `reader`/`writer`. An empty line (or
/// EOF, for piped stdin) confirms the current toggles. A transcript with
/// no recognizable categories skips the prompt and keeps user and
/// assistant turns.
pub fn prompt_filters<R: BufRead, W: Write>(
    content: &str,
    reader: &mut R,
    writer: &mut W,
) -> io::Result<TranscriptFilters> {
    let mut rows = scan_categories(content);
    if rows.is_empty() {
        return Ok(TranscriptFilters {
            user: true,
            assistant: true,
            diff: false,
            tool_result: false,
        });
    }

    writeln!(writer, "Scanning transcript...")?;
    writeln!(writer)?;
    writeln!(writer, "Found content types:")?;
    write_rows(writer, &rows)?;
    writeln!(writer)?;
    writeln!(writer, "Toggle: 1-9 | Confirm: Enter")?;
    write!(writer, "> ")?;
    writer.flush()?;

    let mut input = String::new();
    loop {
        input.clear();
        let read = reader.read_line(&mut input)?;
        let trimmed = input.trim();
        if read == 0 || trimmed.is_empty() {
            break;
        }

        for ch in trimmed.chars() {
            if ('1'..='9').contains(&ch) {
                let idx = ch as usize - '1' as usize;
                if let Some(row) = rows.get_mut(idx) {
                    row.enabled = !row.enabled;
                }
            }
        }

        // Back up over the list and prompt, then redraw in place.
        for _ in 0..rows.len() + 3 {
            write!(writer, "\x1b[F")?;
        }
        writeln!(writer, "Found content types:")?;
        write_rows(writer, &rows)?;
        writeln!(writer)?;
        writeln!(writer, "Toggle: 1-9 | Confirm: Enter")?;
        write!(writer, "> ")?;
        writer.flush()?;
    }
    writeln!(writer)?;

    Ok(filters_from(&rows))
}

/// [`prompt_filters`] over real stdin/stdout.
pub fn prompt_filters_stdio(content: &str) -> io::Result<TranscriptFilters> {
    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut writer = io::stdout();
    prompt_filters(content, &mut reader, &mut writer)
}

fn write_rows<W: Write>(writer: &mut W, rows: &[CategoryCount]) -> io::Result<()> {
    for (i, row) in rows.iter().enumerate() {
        let check = if row.enabled { "x" } else { " " };
        writeln!(
            writer,
            "  {}. [{}] {} ({})",
            i + 1,
            check,
            row.category,
            row.count
        )?;
    }
    Ok(())
}

/// Collapse the toggled rows into parse filters. Categories absent from
/// the transcript stay off; system and other rows have no parse-side
/// effect.
fn filters_from(rows: &[CategoryCount]) -> TranscriptFilters {
    let mut filters = TranscriptFilters {
        user: false,
        assistant: false,
        diff: false,
        tool_result: false,
    };
    for row in rows {
        match row.category {
            Category::User => filters.user = row.enabled,
            Category::Assistant => filters.assistant = row.enabled,
            Category::Diff => filters.diff = row.enabled,
            Category::ToolResult => filters.tool_result = row.enabled,
            Category::System | Category::Other => {}
        }
    }
    filters
}
