use clap::Parser;
use eyre::Result;

use folio::cli::{Cli, Commands};
use folio::img;
use folio::logging;
use folio::recent;
use folio::serve;
use folio_core::block::Block;
use folio_core::parser::{self, FormatParser, JsonlParser, MarkdownParser};
use folio_tui::tui::{selector, terminal};
use std::io::{IsTerminal, Read};
use std::path::PathBuf;
use tracing::{debug, warn};

/// A forced-format subcommand: the parser it forces and the extensions
/// its `-` and `+` shortcuts resolve against.
struct FileKind {
    name: &'static str,
    parser: &'static str,
    extensions: &'static [&'static str],
}

const MD: FileKind = FileKind {
    name: "md",
    parser: "markdown",
    extensions: &[".md", ".markdown"],
};
const TXT: FileKind = FileKind {
    name: "txt",
    parser: "txt",
    extensions: &[".txt", ".log"],
};
// Plain .json files hold todo lists, not transcripts.
const JSON: FileKind = FileKind {
    name: "json",
    parser: "todo",
    extensions: &[".json"],
};
const DIFF: FileKind = FileKind {
    name: "diff",
    parser: "diff",
    extensions: &[".diff", ".patch"],
};
const JSONL: FileKind = FileKind {
    name: "jsonl",
    parser: "jsonl",
    extensions: &[".jsonl"],
};

#[tokio::main]
async fn main() -> Result<()> {
    // Install color-eyre for better error reports
    color_eyre::install()?;

    let cli = Cli::parse();

    // Initialize tracing (level configured via RUST_LOG env var)
    logging::init_logging()?;

    match &cli.command {
        Some(Commands::Pick) => {
            let path = recent::pick_recent(&[])?;
            view_file(&path, &cli).await
        }
        Some(Commands::Latest) => {
            let path = recent::newest_in_cwd(&[])?;
            println!("Opening: {path}");
            view_file(&path, &cli).await
        }
        Some(Commands::Md { target }) => run_forced(&MD, target.as_deref(), &cli).await,
        Some(Commands::Txt { target }) => run_forced(&TXT, target.as_deref(), &cli).await,
        Some(Commands::Json { target }) => run_forced(&JSON, target.as_deref(), &cli).await,
        Some(Commands::Diff { target }) => run_forced(&DIFF, target.as_deref(), &cli).await,
        Some(Commands::Jsonl { target }) => run_forced(&JSONL, target.as_deref(), &cli).await,
        Some(Commands::Img { target }) => run_image(target.as_deref()),
        None => run_default(&cli).await,
    }
}

/// No subcommand: resolve the positional target, or fall back to stdin.
async fn run_default(cli: &Cli) -> Result<()> {
    match cli.file.as_deref() {
        Some("-") => {
            let path = recent::pick_recent(&[])?;
            view_file(&path, cli).await
        }
        Some("+") => {
            let path = recent::newest_in_cwd(&[])?;
            println!("Opening: {path}");
            view_file(&path, cli).await
        }
        Some(file) => {
            let path = expand_path(file);
            if cli.serve {
                serve_file(&path, cli).await
            } else {
                view_file(&path, cli).await
            }
        }
        None => {
            if std::io::stdin().is_terminal() {
                eprintln!("Error: No file provided.");
                eprintln!("Run 'folio help' for usage.");
                std::process::exit(1);
            }
            let content = read_stdin()?;
            if cli.serve {
                serve_stdin(&content, cli).await
            } else {
                view_stdin(&content, None, cli).await
            }
        }
    }
}

/// A format subcommand: parse the target with that parser regardless of
/// extension. With no target, piped stdin is read instead.
async fn run_forced(kind: &FileKind, target: Option<&str>, cli: &Cli) -> Result<()> {
    let Some(target) = target else {
        if std::io::stdin().is_terminal() {
            eyre::bail!("Usage: folio {} [file | - | +]", kind.name);
        }
        let content = read_stdin()?;
        return view_stdin(&content, Some(kind.parser), cli).await;
    };
    let path = resolve_shortcut(target, kind.extensions)?;
    view_text_file(&path, Some(kind.parser), cli).await
}

fn run_image(target: Option<&str>) -> Result<()> {
    let Some(target) = target else {
        eyre::bail!("Usage: folio img [file | - | +]");
    };
    let path = resolve_shortcut(target, img::IMAGE_EXTENSIONS)?;
    if let Err(error) = recent::add_recent(&path) {
        warn!(error = %error, "Failed to record recent file");
    }
    img::view_image(&path)
}

/// View a resolved path, dispatching images to the inline image viewer.
async fn view_file(path: &str, cli: &Cli) -> Result<()> {
    if img::is_image_path(path) {
        if let Err(error) = recent::add_recent(path) {
            warn!(error = %error, "Failed to record recent file");
        }
        return img::view_image(path);
    }
    view_text_file(path, None, cli).await
}

async fn view_text_file(path: &str, forced: Option<&'static str>, cli: &Cli) -> Result<()> {
    let bytes =
        std::fs::read(path).map_err(|e| eyre::eyre!("Failed to read {}: {}", path, e))?;
    let content = String::from_utf8_lossy(&bytes).into_owned();
    if let Err(error) = recent::add_recent(path) {
        warn!(error = %error, "Failed to record recent file");
    }

    let format = match forced {
        Some(name) => {
            parser::parser_named(name).ok_or_else(|| eyre::eyre!("Unknown format: {}", name))?
        }
        None => parser::parser_for_path(path),
    };
    debug!(parser = format.name(), path = %path, "Viewing file");

    if cli.follow {
        setup_signal_handlers().await;
        let transcript = format.name() == "jsonl";
        return folio_tui::run_follow(
            Some(PathBuf::from(path)),
            &content,
            transcript,
            cli.line_numbers,
        )
        .await
        .map_err(|e| eyre::eyre!("TUI error: {}", e));
    }

    let blocks = parse_blocks(format, &content)?;
    setup_signal_handlers().await;
    folio_tui::run_reader(blocks, cli.line_numbers)
        .await
        .map_err(|e| eyre::eyre!("TUI error: {}", e))
}

/// View piped content. `forced` carries a format subcommand's parser;
/// otherwise the format is sniffed from the content itself.
async fn view_stdin(content: &str, forced: Option<&'static str>, cli: &Cli) -> Result<()> {
    let format = match forced {
        Some(name) => {
            parser::parser_named(name).ok_or_else(|| eyre::eyre!("Unknown format: {}", name))?
        }
        None => parser::parser_for_content(content),
    };
    debug!(parser = format.name(), "Viewing stdin");

    if cli.follow {
        setup_signal_handlers().await;
        let transcript = format.name() == "jsonl";
        return folio_tui::run_follow(None, content, transcript, cli.line_numbers)
            .await
            .map_err(|e| eyre::eyre!("TUI error: {}", e));
    }

    let blocks = parse_blocks(format, content)?;
    setup_signal_handlers().await;
    folio_tui::run_reader(blocks, cli.line_numbers)
        .await
        .map_err(|e| eyre::eyre!("TUI error: {}", e))
}

/// Parse for the static reader. Transcripts run the category prompt
/// first; markdown reads as one continuous block sized to the terminal.
fn parse_blocks(format: &'static dyn FormatParser, content: &str) -> Result<Vec<Block>> {
    match format.name() {
        "jsonl" => {
            let filters = selector::prompt_filters_stdio(content)?;
            Ok(JsonlParser::with_filters(filters).parse(content))
        }
        "markdown" => {
            let (_, height) = terminal::detect_size();
            Ok(MarkdownParser.parse_continuous(content, height as usize))
        }
        _ => Ok(format.parse(content)),
    }
}

async fn serve_file(path: &str, cli: &Cli) -> Result<()> {
    let bytes =
        std::fs::read(path).map_err(|e| eyre::eyre!("Failed to read {}: {}", path, e))?;
    let content = String::from_utf8_lossy(&bytes).into_owned();
    if let Err(error) = recent::add_recent(path) {
        warn!(error = %error, "Failed to record recent file");
    }
    let blocks = parser::parser_for_path(path).parse(&content);
    if blocks.is_empty() {
        eyre::bail!("No blocks found in {}", path);
    }
    serve::serve(path, blocks, cli.line_numbers, cli.port).await
}

async fn serve_stdin(content: &str, cli: &Cli) -> Result<()> {
    let blocks = parser::parser_for_content(content).parse(content);
    if blocks.is_empty() {
        eyre::bail!("No blocks found on stdin");
    }
    serve::serve("stdin", blocks, cli.line_numbers, cli.port).await
}

/// Resolve `-` (recent picker) and `+` (newest in cwd) against a format's
/// extensions; anything else is a path.
fn resolve_shortcut(target: &str, extensions: &[&str]) -> Result<String> {
    match target {
        "-" => recent::pick_recent(extensions),
        "+" => {
            let path = recent::newest_in_cwd(extensions)?;
            println!("Opening: {path}");
            Ok(path)
        }
        _ => Ok(expand_path(target)),
    }
}

/// Expand a leading `~/` to the home directory.
fn expand_path(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest).to_string_lossy().into_owned();
        }
    }
    path.to_string()
}

fn read_stdin() -> Result<String> {
    let mut buf = Vec::new();
    std::io::stdin()
        .read_to_end(&mut buf)
        .map_err(|e| eyre::eyre!("Failed to read stdin: {}", e))?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

async fn setup_signal_handlers() {
    // Set up signal handler for SIGINT, SIGTERM
    #[cfg(not(windows))]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let _sigterm_task = tokio::spawn(async move {
            let mut sigterm = match signal(SignalKind::terminate()) {
                Ok(signal) => signal,
                Err(error) => {
                    warn!(error = %error, "Failed to set up SIGTERM handler");
                    return;
                }
            };
            sigterm.recv().await;

            // Always clean up terminal on SIGTERM
            terminal::cleanup();

            std::process::exit(0);
        });

        let _sigint_task = tokio::spawn(async move {
            let mut sigint = match signal(SignalKind::interrupt()) {
                Ok(signal) => signal,
                Err(error) => {
                    warn!(error = %error, "Failed to set up SIGINT handler");
                    return;
                }
            };
            sigint.recv().await;

            // Always clean up terminal on SIGINT
            terminal::cleanup();
            std::process::exit(130); // Standard exit code for SIGINT
        });
    }

    #[cfg(windows)]
    {
        let _ctrl_c_task = tokio::spawn(async move {
            tokio::signal::ctrl_c().await.ok();
            // Always clean up terminal on Ctrl+C
            terminal::cleanup();
            std::process::exit(130);
        });
    }
}
