//! Live-updating views of growing files.
//!
//! Watchers are plain polling tasks (no inotify: transcripts are appended
//! by other processes at human speed, and polling behaves identically on
//! every platform). They never touch the block index themselves; each
//! change is described as a [`FollowEvent`] on an mpsc channel, and the
//! single consumer that owns the index applies events with
//! [`apply_event`]. That keeps every mutation on one thread, in arrival
//! order.

use std::io::SeekFrom;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::block::Block;
use crate::error::Result;
use crate::index::BlockIndex;
use crate::parser::{self, format_question_indexed, parse_line, JsonlParser, Turn, TurnPart};

/// How an index should change to catch up with the watched file.
#[derive(Debug, Clone, PartialEq)]
pub enum FollowEvent {
    /// A new conversation turn opened; append its block.
    Append(Block),
    /// The open turn grew; replace the block at `index` with the
    /// re-rendered one.
    Rewrite { index: usize, block: Block },
    /// The file changed as a whole; replace every block.
    Reload(Vec<Block>),
}

#[derive(Debug, Clone, Copy)]
pub struct FollowOptions {
    pub poll_interval: Duration,
}

impl Default for FollowOptions {
    fn default() -> Self {
        FollowOptions {
            poll_interval: Duration::from_millis(500),
        }
    }
}

/// Apply one event to the index. Returns the position worth showing (the
/// touched block), or `None` when the event was stale or emptying.
pub fn apply_event(target: &mut BlockIndex, event: FollowEvent) -> Option<usize> {
    match event {
        FollowEvent::Append(block) => Some(target.push(block)),
        FollowEvent::Rewrite { index, block } => target.replace(index, block).then_some(index),
        FollowEvent::Reload(blocks) => {
            target.rebuild(blocks);
            target.len().checked_sub(1)
        }
    }
}

/// Tail a conversation transcript.
///
/// Starts at the current end of the file (the caller already parsed the
/// existing content into `base_blocks` blocks, and turn numbering
/// continues from there). Each complete appended line is dispatched with
/// the same rules as [`JsonlParser::parse`]: a genuine user message opens
/// a turn and emits [`FollowEvent::Append`]; assistant text, inline
/// diffs, tool summaries and pending questions extend the open turn and
/// emit [`FollowEvent::Rewrite`]. A truncated file restarts from offset
/// zero.
pub async fn watch_transcript(
    path: PathBuf,
    parser: JsonlParser,
    base_blocks: usize,
    options: FollowOptions,
    events: mpsc::Sender<FollowEvent>,
    cancel: CancellationToken,
) -> Result<()> {
    let filters = parser.filters;
    let mut file = fs::File::open(&path).await?;
    let mut offset = file.seek(SeekFrom::End(0)).await?;

    // Incomplete trailing lines stay buffered (as bytes, so a multi-byte
    // character split across reads survives) until their newline arrives.
    let mut pending: Vec<u8> = Vec::new();
    let mut turn_number = base_blocks;
    let mut turn: Option<Turn> = None;
    let mut block_position = 0;
    let mut next_position = base_blocks;

    loop {
        tokio::select! {
            () = cancel.cancelled() => return Ok(()),
            () = tokio::time::sleep(options.poll_interval) => {}
        }

        // Drain everything appended since the last tick.
        let mut chunk = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            match file.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => chunk.extend_from_slice(&buf[..n]),
            }
        }

        if chunk.is_empty() {
            if let Ok(meta) = fs::metadata(&path).await {
                if meta.len() < offset {
                    debug!("watched transcript shrank, restarting from the top");
                    file.seek(SeekFrom::Start(0)).await?;
                    offset = 0;
                    pending.clear();
                }
            }
            continue;
        }
        offset += chunk.len() as u64;
        pending.extend_from_slice(&chunk);

        while let Some(newline) = pending.iter().position(|&b| b == b'\n') {
            let line_bytes: Vec<u8> = pending.drain(..=newline).collect();
            let line = String::from_utf8_lossy(&line_bytes[..line_bytes.len() - 1]);
            let Some(parsed) = parse_line(&line) else {
                continue;
            };

            match parsed.kind() {
                "user" if parsed.is_tool_result() => {
                    let Some(open) = turn.as_mut() else {
                        continue;
                    };
                    let mut changed = false;
                    if filters.diff {
                        if let Some((diff, path)) = parsed.patch_diff() {
                            open.parts.push(TurnPart::Diff { diff, path });
                            changed = true;
                        }
                    }
                    if filters.tool_result {
                        if let Some(summary) = parsed.tool_summary() {
                            open.parts.push(TurnPart::ToolResult(summary));
                            changed = true;
                        }
                    }
                    if changed {
                        let event = FollowEvent::Rewrite {
                            index: block_position,
                            block: open.to_block(),
                        };
                        if events.send(event).await.is_err() {
                            return Ok(());
                        }
                    }
                }
                "user" => {
                    if !filters.user {
                        continue;
                    }
                    let text = parsed.user_text();
                    if text.is_empty() {
                        continue;
                    }
                    turn_number += 1;
                    let opened = Turn::open(turn_number, text, 0);
                    let block = opened.to_block();
                    turn = Some(opened);
                    block_position = next_position;
                    next_position += 1;
                    if events.send(FollowEvent::Append(block)).await.is_err() {
                        return Ok(());
                    }
                }
                "assistant" => {
                    if !filters.assistant {
                        continue;
                    }
                    let Some(open) = turn.as_mut() else {
                        continue;
                    };
                    let mut changed = false;
                    let text = parsed.assistant_text();
                    if !text.is_empty() {
                        open.parts.push(TurnPart::Assistant(text));
                        changed = true;
                    }
                    let questions = parsed.questions();
                    let total = questions.len();
                    for (i, question) in questions.iter().enumerate() {
                        let rendered = format_question_indexed(question, i + 1, total);
                        open.parts.push(TurnPart::Question(rendered));
                        changed = true;
                    }
                    if changed {
                        let event = FollowEvent::Rewrite {
                            index: block_position,
                            block: open.to_block(),
                        };
                        if events.send(event).await.is_err() {
                            return Ok(());
                        }
                    }
                }
                _ => {}
            }
        }
    }
}

/// Watch any other file by modification time; every change triggers a
/// full re-parse through the parser the path selects. Parses that come
/// back empty are ignored so a half-written file never blanks the view.
pub async fn watch_generic(
    path: PathBuf,
    options: FollowOptions,
    events: mpsc::Sender<FollowEvent>,
    cancel: CancellationToken,
) -> Result<()> {
    let parser = parser::parser_for_path(&path.to_string_lossy());
    let mut last_modified: Option<SystemTime> = None;

    loop {
        tokio::select! {
            () = cancel.cancelled() => return Ok(()),
            () = tokio::time::sleep(options.poll_interval) => {}
        }

        let Ok(meta) = fs::metadata(&path).await else {
            continue;
        };
        let Ok(modified) = meta.modified() else {
            continue;
        };
        if last_modified.is_some_and(|last| modified <= last) {
            continue;
        }
        last_modified = Some(modified);

        let Ok(content) = fs::read_to_string(&path).await else {
            continue;
        };
        let blocks = parser.parse(&content);
        if blocks.is_empty() {
            continue;
        }
        if events.send(FollowEvent::Reload(blocks)).await.is_err() {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::SourceKind;
    use std::io::Write;

    fn short_poll() -> FollowOptions {
        FollowOptions {
            poll_interval: Duration::from_millis(25),
        }
    }

    fn block(name: &str) -> Block {
        Block::from_content(name, format!("{name} text"), 0, SourceKind::Other)
    }

    #[test]
    fn test_apply_append_and_rewrite() {
        let mut index = BlockIndex::new(vec![block("a")]);
        assert_eq!(apply_event(&mut index, FollowEvent::Append(block("b"))), Some(1));
        assert_eq!(index.len(), 2);

        let replacement = block("b2");
        let applied = apply_event(
            &mut index,
            FollowEvent::Rewrite {
                index: 1,
                block: replacement,
            },
        );
        assert_eq!(applied, Some(1));
        assert_eq!(index.get(1).unwrap().name, "b2");

        // A stale rewrite (index gone) is dropped, not applied.
        let applied = apply_event(
            &mut index,
            FollowEvent::Rewrite {
                index: 9,
                block: block("ghost"),
            },
        );
        assert_eq!(applied, None);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_apply_reload_replaces_everything() {
        let mut index = BlockIndex::new(vec![block("a"), block("b")]);
        let applied = apply_event(&mut index, FollowEvent::Reload(vec![block("c")]));
        assert_eq!(applied, Some(0));
        assert_eq!(index.len(), 1);
        assert_eq!(index.get(0).unwrap().name, "c");
    }

    async fn recv(
        rx: &mut mpsc::Receiver<FollowEvent>,
    ) -> FollowEvent {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for a follow event")
            .expect("event channel closed early")
    }

    #[tokio::test]
    async fn test_transcript_watcher_appends_and_rewrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.jsonl");
        std::fs::write(
            &path,
            "{\"type\":\"user\",\"message\":{\"content\":\"first\"}}\n",
        )
        .unwrap();

        let (tx, mut rx) = mpsc::channel(16);
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(watch_transcript(
            path.clone(),
            JsonlParser::default(),
            1,
            short_poll(),
            tx,
            cancel.clone(),
        ));

        // Give the watcher time to open the file and seek to its end.
        tokio::time::sleep(Duration::from_millis(150)).await;
        let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "{}", "{\"type\":\"user\",\"message\":{\"content\":\"second\"}}").unwrap();
        writeln!(
            file,
            "{}",
            "{\"type\":\"assistant\",\"message\":{\"content\":[{\"type\":\"text\",\"text\":\"reply\"}]}}"
        )
        .unwrap();
        drop(file);

        let FollowEvent::Append(appended) = recv(&mut rx).await else {
            panic!("expected an append first");
        };
        assert_eq!(appended.name, "block-2");
        assert!(appended.content.contains("second"));

        let FollowEvent::Rewrite { index, block } = recv(&mut rx).await else {
            panic!("expected a rewrite after the assistant line");
        };
        assert_eq!(index, 1);
        assert!(block.content.contains("second"));
        assert!(block.content.contains("reply"));

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_transcript_watcher_recovers_from_truncation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.jsonl");
        std::fs::write(
            &path,
            "{\"type\":\"user\",\"message\":{\"content\":\"first\"}}\n",
        )
        .unwrap();

        let (tx, mut rx) = mpsc::channel(16);
        let cancel = CancellationToken::new();
        tokio::spawn(watch_transcript(
            path.clone(),
            JsonlParser::default(),
            1,
            short_poll(),
            tx,
            cancel.clone(),
        ));
        tokio::time::sleep(Duration::from_millis(150)).await;

        let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "{}", "{\"type\":\"user\",\"message\":{\"content\":\"second\"}}").unwrap();
        drop(file);
        let FollowEvent::Append(appended) = recv(&mut rx).await else {
            panic!("expected an append");
        };
        assert_eq!(appended.name, "block-2");

        // Rotate the file: truncate and write a fresh line. The watcher
        // seeks back to zero and keeps numbering.
        std::fs::write(
            &path,
            "{\"type\":\"user\",\"message\":{\"content\":\"fresh\"}}\n",
        )
        .unwrap();
        let FollowEvent::Append(appended) = recv(&mut rx).await else {
            panic!("expected an append after truncation");
        };
        assert_eq!(appended.name, "block-3");
        assert!(appended.content.contains("fresh"));
        cancel.cancel();
    }

    #[tokio::test]
    async fn test_generic_watcher_reloads_on_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.md");
        std::fs::write(&path, "# One\nbody\n").unwrap();

        let (tx, mut rx) = mpsc::channel(16);
        let cancel = CancellationToken::new();
        tokio::spawn(watch_generic(path.clone(), short_poll(), tx, cancel.clone()));

        // The first tick reloads the initial content.
        let FollowEvent::Reload(blocks) = recv(&mut rx).await else {
            panic!("expected the initial reload");
        };
        assert_eq!(blocks.len(), 1);

        tokio::time::sleep(Duration::from_millis(100)).await;
        std::fs::write(&path, "# One\nbody\n# Two\nmore\n").unwrap();
        let FollowEvent::Reload(blocks) = recv(&mut rx).await else {
            panic!("expected a reload after the edit");
        };
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].name, "Two");
        cancel.cancel();
    }

    #[tokio::test]
    async fn test_watchers_stop_on_cancel() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.jsonl");
        std::fs::write(&path, "").unwrap();

        let (tx, _rx) = mpsc::channel(16);
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(watch_transcript(
            path,
            JsonlParser::default(),
            0,
            short_poll(),
            tx,
            cancel.clone(),
        ));
        cancel.cancel();
        let joined = tokio::time::timeout(Duration::from_secs(1), handle).await;
        assert!(joined.is_ok());
    }

    #[tokio::test]
    async fn test_transcript_watcher_errors_on_missing_file() {
        let (tx, _rx) = mpsc::channel(16);
        let result = watch_transcript(
            PathBuf::from("/no/such/file.jsonl"),
            JsonlParser::default(),
            0,
            short_poll(),
            tx,
            CancellationToken::new(),
        )
        .await;
        assert!(result.is_err());
    }
}
