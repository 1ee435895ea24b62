//! `--serve` mode: render the blocks to one HTML document, serve it over
//! HTTP, and re-render whenever the source file changes on disk. Connected
//! browsers hold an SSE stream on `/events` and reload themselves when a
//! re-render lands.

use std::convert::Infallible;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use axum::Router;
use axum::extract::State;
use axum::response::Html;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::get;
use eyre::Result;
use folio_core::block::Block;
use folio_core::parser::parser_for_path;
use tokio::sync::{RwLock, broadcast};
use tokio_stream::Stream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::html::render_page;

const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Shared server state. The rendered document is the one piece of mutable
/// state: many request handlers read it, the single watcher task replaces
/// it wholesale.
#[derive(Clone)]
struct AppState {
    page: Arc<RwLock<String>>,
    reload: broadcast::Sender<()>,
}

/// Serve `blocks` at `http://localhost:{port}` until the process exits.
///
/// `source` is the path the blocks were parsed from, or `"stdin"`; the
/// file watcher only runs for real paths. Runs on the caller's runtime and
/// does not return under normal operation.
pub async fn serve(
    source: &str,
    blocks: Vec<Block>,
    show_line_numbers: bool,
    port: u16,
) -> Result<()> {
    let title = Path::new(source)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(source)
        .to_string();

    let page = render_page(&title, &blocks, show_line_numbers);
    let (reload, _) = broadcast::channel(8);
    let state = AppState {
        page: Arc::new(RwLock::new(page)),
        reload,
    };

    let cancel = CancellationToken::new();
    let watcher = if source == "stdin" {
        None
    } else {
        Some(tokio::spawn(watch_and_rerender(
            source.to_string(),
            title,
            show_line_numbers,
            state.clone(),
            cancel.clone(),
        )))
    };

    let router = Router::new()
        .route("/", get(index))
        .route("/events", get(events))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .map_err(|e| eyre::eyre!("Failed to bind port {}: {}", port, e))?;
    eprintln!("Serving {source} at http://localhost:{port}");

    let served = axum::serve(listener, router).await;
    cancel.cancel();
    if let Some(task) = watcher {
        task.abort();
    }
    Ok(served?)
}

async fn index(State(state): State<AppState>) -> Html<String> {
    Html(state.page.read().await.clone())
}

/// SSE endpoint. Each message is `data: reload`; a lagged subscriber just
/// coalesces pending reloads into the next one.
async fn events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut rx = state.reload.subscribe();
    let stream = async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(()) => yield Ok::<_, Infallible>(Event::default().data("reload")),
                Err(broadcast::error::RecvError::Closed) => break,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    debug!(lagged = n, "Reload subscriber lagged, coalescing");
                }
            }
        }
    };
    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Poll the source's mtime twice a second. On change, re-parse with the
/// path-detected parser, swap the rendered page, and notify subscribers.
async fn watch_and_rerender(
    path: String,
    title: String,
    show_line_numbers: bool,
    state: AppState,
    cancel: CancellationToken,
) {
    let mut last_modified: Option<SystemTime> = None;
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(POLL_INTERVAL) => {}
        }

        let modified = match tokio::fs::metadata(&path).await.and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(_) => continue,
        };
        if last_modified.is_some_and(|prev| modified <= prev) {
            continue;
        }
        last_modified = Some(modified);

        if let Some(page) = rerender_source(&path, &title, show_line_numbers).await {
            *state.page.write().await = page;
            let _ = state.reload.send(());
            debug!(path = %path, "Source changed, page re-rendered");
        }
    }
}

/// Re-read and re-render one source file. `None` keeps the current page:
/// the file may be mid-write, or transiently empty of blocks.
async fn rerender_source(path: &str, title: &str, show_line_numbers: bool) -> Option<String> {
    let content = match tokio::fs::read(path).await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(error) => {
            warn!(error = %error, path = %path, "Failed to re-read source, keeping current page");
            return None;
        }
    };

    let blocks = parser_for_path(path).parse(&content);
    if blocks.is_empty() {
        debug!(path = %path, "Re-parse produced no blocks, keeping current page");
        return None;
    }
    Some(render_page(title, &blocks, show_line_numbers))
}
