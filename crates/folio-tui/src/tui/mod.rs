//! Terminal viewer built on ratatui.
//!
//! Two modes share the page renderer. The reader assembles every page of
//! every block into one scroll buffer up front; follow mode shows one
//! page at a time, tails the file through the core watchers and keeps the
//! view pinned to the newest content.

use std::io::{self, Stdout};
use std::path::PathBuf;
use std::time::Duration;

use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::text::Line;
use ratatui::widgets::Paragraph;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use folio_core::block::Block;
use folio_core::follow::{self, FollowEvent, FollowOptions};
use folio_core::index::BlockIndex;
use folio_core::navigator::{Command, Navigator};
use folio_core::parser::{self, FormatParser, JsonlParser};

use crate::error::{Error, Result};
use crate::tui::theme::Theme;
use crate::tui::widgets::block::{RenderConfig, render_page};

pub mod selector;
pub mod terminal;
pub mod theme;
pub mod widgets;

/// Static reader: every page of every block in a single scrollable
/// buffer, vim-style movement over it.
struct Reader {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    terminal_size: (u16, u16),
    blocks: Vec<Block>,
    lines: Vec<Line<'static>>,
    scroll: usize,
    show_line_numbers: bool,
    theme: Theme,
}

impl Reader {
    /// Re-render the whole buffer at the current width and return to the
    /// top, as on startup and after a width change.
    fn render_all(&mut self) {
        let cfg = RenderConfig {
            width: self.terminal_size.0,
            show_line_numbers: self.show_line_numbers,
        };
        self.lines = assemble_lines(&self.blocks, &cfg, &self.theme);
        self.scroll = 0;
    }

    fn max_scroll(&self) -> usize {
        self.lines
            .len()
            .saturating_sub(self.terminal_size.1 as usize)
    }

    fn draw(&mut self) -> Result<()> {
        self.scroll = self.scroll.min(self.max_scroll());
        let visible: Vec<Line<'static>> = self
            .lines
            .iter()
            .skip(self.scroll)
            .take(self.terminal_size.1 as usize)
            .cloned()
            .collect();
        self.terminal.draw(|f| {
            f.render_widget(Paragraph::new(visible), f.area());
        })?;
        Ok(())
    }

    /// Returns true when the key asks to exit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        let height = self.terminal_size.1 as usize;
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Char('q' | 'Q') | KeyCode::Esc => return true,
            KeyCode::Char('j' | 'J') => self.scroll = (self.scroll + 3).min(self.max_scroll()),
            KeyCode::Char('k' | 'K') => self.scroll = self.scroll.saturating_sub(3),
            KeyCode::Char('d') => self.scroll = (self.scroll + height / 2).min(self.max_scroll()),
            KeyCode::Char('u') => self.scroll = self.scroll.saturating_sub(height / 2),
            KeyCode::Char('g') => self.scroll = 0,
            KeyCode::Char('G') => self.scroll = self.max_scroll(),
            KeyCode::PageDown => self.scroll = (self.scroll + height).min(self.max_scroll()),
            KeyCode::PageUp => self.scroll = self.scroll.saturating_sub(height),
            _ => {}
        }
        false
    }
}

/// Run the static reader over already-parsed blocks.
pub async fn run_reader(blocks: Vec<Block>, show_line_numbers: bool) -> Result<()> {
    if blocks.is_empty() {
        println!("Error: No blocks found in file.");
        return Ok(());
    }
    info!(target: "tui.run", "starting reader with {} blocks", blocks.len());

    terminal::setup_panic_hook();
    let terminal = setup_terminal()?;
    let mut guard = terminal::SetupGuard::new();
    let terminal_size = terminal
        .size()
        .map(|s| (s.width, s.height))
        .unwrap_or((80, 24));

    let mut app = Reader {
        terminal,
        terminal_size,
        blocks,
        lines: Vec::new(),
        scroll: 0,
        show_line_numbers,
        theme: Theme::default(),
    };
    app.render_all();

    let (mut input_rx, input_handle) = spawn_input_task();
    let mut should_exit = false;
    let mut needs_redraw = true;

    while !should_exit {
        if needs_redraw {
            app.draw()?;
            needs_redraw = false;
        }
        match input_rx.recv().await {
            Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                if app.handle_key(key) {
                    should_exit = true;
                }
                needs_redraw = true;
            }
            Some(Ok(Event::Resize(width, height))) => {
                let rerender = width != app.terminal_size.0;
                app.terminal_size = (width, height);
                if rerender {
                    app.render_all();
                }
                needs_redraw = true;
            }
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                error!(target: "tui.run", "Fatal input error: {}. Exiting.", e);
                should_exit = true;
            }
            None => should_exit = true,
        }
    }

    input_handle.abort();
    guard.disarm();
    terminal::cleanup();
    Ok(())
}

/// Follow mode: one page at a time, cursor pinned to the newest content
/// as the watched file grows.
struct Follower {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    terminal_size: (u16, u16),
    navigator: Navigator,
    scroll: u16,
    show_line_numbers: bool,
    theme: Theme,
}

impl Follower {
    fn draw(&mut self) -> Result<()> {
        let cfg = RenderConfig {
            width: self.terminal_size.0,
            show_line_numbers: self.show_line_numbers,
        };
        let lines = match self.navigator.current_block() {
            Some(block) => render_page(block, self.navigator.page(), &cfg, &self.theme),
            None => vec![Line::default()],
        };
        let max_scroll = lines.len().saturating_sub(self.terminal_size.1 as usize) as u16;
        self.scroll = self.scroll.min(max_scroll);
        let paragraph = Paragraph::new(lines).scroll((self.scroll, 0));
        self.terminal.draw(|f| {
            f.render_widget(paragraph, f.area());
        })?;
        Ok(())
    }

    /// Returns true when the key asks to exit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Char('q') => return true,
            KeyCode::Char('j') | KeyCode::Right => self.move_block(Command::Next),
            KeyCode::Char('J') | KeyCode::Left => self.move_block(Command::Prev),
            KeyCode::Down => self.scroll = self.scroll.saturating_add(1),
            KeyCode::Up => self.scroll = self.scroll.saturating_sub(1),
            _ => {}
        }
        false
    }

    fn move_block(&mut self, command: Command) {
        self.navigator.run(&command);
        // Boundary misses still rewind to the first page.
        while self.navigator.prev_page() {}
        self.scroll = 0;
    }

    fn apply_follow_event(&mut self, event: FollowEvent) {
        apply_follow(&mut self.navigator, event);
        self.scroll = 0;
    }
}

/// Tail a file on screen. `transcript` selects conversation semantics:
/// the category prompt runs first (on the plain terminal) and appended
/// lines extend or open turns; any other file reloads wholesale on
/// change. A `None` path (piped stdin) shows the initial content without
/// watching.
pub async fn run_follow(
    path: Option<PathBuf>,
    content: &str,
    transcript: bool,
    show_line_numbers: bool,
) -> Result<()> {
    let (blocks, filters) = if transcript {
        let filters = selector::prompt_filters_stdio(content)?;
        let jsonl = JsonlParser::with_filters(filters);
        (jsonl.parse(content), Some(filters))
    } else {
        let format = match &path {
            Some(p) => parser::parser_for_path(&p.to_string_lossy()),
            None => parser::parser_for_content(content),
        };
        (format.parse(content), None)
    };

    if blocks.is_empty() {
        println!("Error: No blocks found in file.");
        return Ok(());
    }
    info!(target: "tui.follow", "starting follow mode with {} blocks", blocks.len());

    let mut navigator = Navigator::new(BlockIndex::new(blocks));
    let last = navigator.block_count() - 1;
    navigator.jump_to(last);
    while navigator.next_page() {}

    let cancel = CancellationToken::new();
    let (follow_tx, mut follow_rx) = mpsc::channel::<FollowEvent>(16);
    let mut watcher: Option<JoinHandle<()>> = None;
    if let Some(path) = path {
        let tx = follow_tx.clone();
        let token = cancel.clone();
        let options = FollowOptions::default();
        let base = navigator.block_count();
        watcher = Some(match filters {
            Some(filters) => tokio::spawn(async move {
                let jsonl = JsonlParser::with_filters(filters);
                if let Err(e) =
                    follow::watch_transcript(path, jsonl, base, options, tx, token).await
                {
                    warn!(target: "tui.follow", "transcript watcher stopped: {e}");
                }
            }),
            None => tokio::spawn(async move {
                if let Err(e) = follow::watch_generic(path, options, tx, token).await {
                    warn!(target: "tui.follow", "file watcher stopped: {e}");
                }
            }),
        });
    }
    drop(follow_tx);

    terminal::setup_panic_hook();
    let terminal = setup_terminal()?;
    let mut guard = terminal::SetupGuard::new();
    let terminal_size = terminal
        .size()
        .map(|s| (s.width, s.height))
        .unwrap_or((80, 24));

    let mut app = Follower {
        terminal,
        terminal_size,
        navigator,
        scroll: 0,
        show_line_numbers,
        theme: Theme::default(),
    };

    let (mut input_rx, input_handle) = spawn_input_task();
    let mut should_exit = false;
    let mut needs_redraw = true;

    while !should_exit {
        if needs_redraw {
            app.draw()?;
            needs_redraw = false;
        }
        tokio::select! {
            Some(event_res) = input_rx.recv() => {
                match event_res {
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                        if app.handle_key(key) {
                            should_exit = true;
                        }
                        needs_redraw = true;
                    }
                    Ok(Event::Resize(width, height)) => {
                        app.terminal_size = (width, height);
                        needs_redraw = true;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        error!(target: "tui.follow", "Fatal input error: {}. Exiting.", e);
                        should_exit = true;
                    }
                }
            }
            Some(event) = follow_rx.recv() => {
                app.apply_follow_event(event);
                needs_redraw = true;
            }
        }
    }

    cancel.cancel();
    if let Some(handle) = watcher {
        handle.abort();
    }
    input_handle.abort();
    guard.disarm();
    terminal::cleanup();
    Ok(())
}

/// Every page of every block, concatenated in order.
fn assemble_lines(blocks: &[Block], cfg: &RenderConfig, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for block in blocks {
        for page in 0..block.page_count() {
            lines.extend(render_page(block, page, cfg, theme));
        }
    }
    lines
}

/// Apply one watcher event and move the cursor the way follow mode
/// expects: appended or rewritten turns pin to their last page, a reload
/// lands on the first page of the newest block.
fn apply_follow(navigator: &mut Navigator, event: FollowEvent) {
    let pin_last = !matches!(event, FollowEvent::Reload(_));
    let moved = follow::apply_event(navigator.index_mut(), event);
    navigator.sync();
    if let Some(position) = moved {
        if navigator.jump_to(position) && pin_last {
            while navigator.next_page() {}
        }
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = io::stdout();
    terminal::setup(&mut stdout)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

/// Forward terminal events onto a channel from a background task, so the
/// main loop can select over input and watcher events together.
fn spawn_input_task() -> (mpsc::Receiver<Result<Event>>, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel::<Result<Event>>(1);
    let handle = tokio::spawn(async move {
        loop {
            // Non-blocking poll
            if event::poll(Duration::ZERO).unwrap_or(false) {
                match event::read() {
                    Ok(evt) => {
                        if tx.send(Ok(evt)).await.is_err() {
                            break; // Receiver dropped
                        }
                    }
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => {
                        debug!(target: "tui.input", "Ignoring interrupted syscall");
                        continue;
                    }
                    Err(e) => {
                        warn!(target: "tui.input", "Input error: {}", e);
                        if tx.send(Err(Error::from(e))).await.is_err() {
                            break;
                        }
                        break;
                    }
                }
            } else {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        }
    });
    (rx, handle)
}
