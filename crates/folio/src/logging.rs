use chrono::Local;
use std::io;
use tracing_appender::rolling;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    prelude::*,
};

/// Initialize the tracing system with a file logger that appends to a
/// timestamp-named file under `~/.folio/logs`. Configuration is loaded
/// from the RUST_LOG environment variable.
///
/// Without a home directory the fallback writes to stderr; stdout stays
/// reserved for the TUI.
pub fn init_logging() -> io::Result<()> {
    let now = Local::now();
    let timestamp = now.format("%Y%m%d_%H%M%S");

    if let Some(home_dir) = dirs::home_dir() {
        let log_dir = home_dir.join(".folio").join("logs");
        std::fs::create_dir_all(&log_dir)?;

        // Create the file appender directly (synchronous writing)
        let file_appender = rolling::never(log_dir.clone(), format!("{}.log", timestamp));

        let filter = EnvFilter::from_default_env();

        let subscriber = tracing_subscriber::registry()
            .with(
                fmt::Layer::new()
                    .with_writer(file_appender)
                    .with_ansi(false)
                    .with_span_events(FmtSpan::CLOSE)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(filter);

        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set global default subscriber");

        tracing::debug!(
            target: "folio::logging",
            path = %log_dir.join(format!("{}.log", timestamp)).display(),
            "Tracing initialized with file output. Filter configured via RUST_LOG env var."
        );
    } else {
        let filter = EnvFilter::from_default_env();

        let subscriber = tracing_subscriber::registry()
            .with(
                fmt::Layer::default()
                    .with_writer(io::stderr)
                    .with_ansi(false)
                    .with_target(true),
            )
            .with(filter);

        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set global default subscriber");

        tracing::debug!(
            target: "folio::logging",
            "Tracing initialized with stderr output. Filter configured via RUST_LOG env var."
        );
    }

    Ok(())
}
