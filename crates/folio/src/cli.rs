use clap::{Parser, Subcommand};

const AFTER_HELP: &str = "\
Formats:
  markdown     .md .markdown        plain text   .txt .log
  diffs        .diff .patch         todo lists   .json
  transcripts  .jsonl               images       .png .jpg .gif .webp .bmp .svg

Keys:
  j / k            scroll down / up
  d / u            half page down / up
  g / G            top / bottom
  PgDn / PgUp      full page down / up
  q                quit

Images require chafa (brew install chafa).";

/// Read any file in the terminal, rendered.
#[derive(Parser)]
#[command(version, about, long_about = None, author, after_help = AFTER_HELP)]
pub struct Cli {
    /// File to view; `-` picks from recent files, `+` opens the newest
    /// file in the current directory. Reads stdin when omitted.
    pub file: Option<String>,

    /// Show source line numbers in the gutter
    #[arg(short = 'n', long = "line-numbers", global = true)]
    pub line_numbers: bool,

    /// Re-parse the file as it grows and track the newest block
    #[arg(short = 'f', long, global = true)]
    pub follow: bool,

    /// Serve the rendered document over HTTP with live reload
    #[arg(long, global = true)]
    pub serve: bool,

    /// Port for --serve
    #[arg(long, env = "FOLIO_PORT", default_value = "8080", global = true)]
    pub port: u16,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Pick from recently viewed files
    #[command(alias = "p")]
    Pick,
    /// Open the newest file in the current directory
    #[command(alias = "l")]
    Latest,
    /// Force the markdown parser
    Md {
        /// File to view; `-` picks from recent files of this type, `+` opens the newest
        target: Option<String>,
    },
    /// Force the plain-text parser
    Txt {
        /// File to view, or `-` / `+`
        target: Option<String>,
    },
    /// Force the todo-list parser
    Json {
        /// File to view, or `-` / `+`
        target: Option<String>,
    },
    /// Force the diff parser
    Diff {
        /// File to view, or `-` / `+`
        target: Option<String>,
    },
    /// Force the transcript parser
    Jsonl {
        /// File to view, or `-` / `+`
        target: Option<String>,
    },
    /// Render an image inline in the terminal
    Img {
        /// Image to preview, or `-` / `+`
        target: Option<String>,
    },
}
