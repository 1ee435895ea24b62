use ratatui::crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode, size},
};
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

/// Global terminal state to make cleanup idempotent across exit, panic and signal paths
pub struct TerminalState {
    pub(crate) raw: AtomicBool,
    pub(crate) alt_screen: AtomicBool,
}

impl Default for TerminalState {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalState {
    pub const fn new() -> Self {
        Self {
            raw: AtomicBool::new(false),
            alt_screen: AtomicBool::new(false),
        }
    }
}

pub static TERMINAL_STATE: TerminalState = TerminalState::new();

/// Set up terminal modes. Flags are updated only after each successful step.
pub fn setup<W: Write>(w: &mut W) -> io::Result<()> {
    // raw mode
    enable_raw_mode()?;
    TERMINAL_STATE.raw.store(true, Ordering::Relaxed);

    // alt screen
    execute!(w, EnterAlternateScreen)?;
    TERMINAL_STATE.alt_screen.store(true, Ordering::Relaxed);

    Ok(())
}

/// Cleanup helper that writes escape sequences to the provided writer.
/// Uses global flags to avoid double-disabling.
pub fn cleanup_with_writer<W: Write>(writer: &mut W) {
    if TERMINAL_STATE.alt_screen.swap(false, Ordering::Relaxed) {
        let _ = execute!(writer, LeaveAlternateScreen);
    }
    if TERMINAL_STATE.raw.swap(false, Ordering::Relaxed) {
        let _ = disable_raw_mode();
    }
    let _ = writer.flush();
}

/// Best-effort cleanup across common output streams.
pub fn cleanup() {
    {
        let mut out = io::stdout();
        cleanup_with_writer(&mut out);
        let _ = out.flush();
    }
    {
        let mut err = io::stderr();
        cleanup_with_writer(&mut err);
        let _ = err.flush();
    }
    #[cfg(not(windows))]
    if let Ok(mut tty) = std::fs::OpenOptions::new().write(true).open("/dev/tty") {
        cleanup_with_writer(&mut tty);
        let _ = tty.flush();
    }
}

/// Terminal dimensions with fallbacks for non-tty contexts: the COLUMNS
/// and LINES environment variables when set, 80x24 otherwise.
pub fn detect_size() -> (u16, u16) {
    if let Ok((width, height)) = size() {
        if width > 0 && height > 0 {
            return (width, height);
        }
    }
    let width = env_dimension("COLUMNS").unwrap_or(80);
    let height = env_dimension("LINES").unwrap_or(24);
    (width, height)
}

fn env_dimension(name: &str) -> Option<u16> {
    std::env::var(name)
        .ok()?
        .trim()
        .parse()
        .ok()
        .filter(|n: &u16| *n > 0)
}

/// Install a panic hook that restores the terminal before the default hook
/// prints the panic message, so it lands on a usable screen.
pub fn setup_panic_hook() {
    let original = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        cleanup();
        original(info);
    }));
}

/// RAII guard used during terminal setup to ensure cleanup on early-return paths.
/// It does not track per-step state; it relies on the global TERMINAL_STATE flags.
pub struct SetupGuard {
    armed: bool,
}

impl Default for SetupGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl SetupGuard {
    pub fn new() -> Self {
        Self { armed: true }
    }

    pub fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for SetupGuard {
    fn drop(&mut self) {
        if self.armed {
            cleanup();
        }
    }
}
