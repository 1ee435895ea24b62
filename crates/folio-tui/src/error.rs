//! Error types for the folio-tui crate

use std::io;
use thiserror::Error;

/// Result type alias for folio-tui operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for folio-tui
#[derive(Error, Debug)]
pub enum Error {
    /// Terminal I/O errors
    #[error("Terminal I/O error: {0}")]
    Io(#[from] io::Error),

    /// UI rendering errors
    #[error("UI rendering error: {0}")]
    Rendering(String),

    /// Channel communication errors
    #[error("Channel error: {0}")]
    Channel(String),

    /// Core errors from folio-core
    #[error("Core error: {0}")]
    Core(#[from] folio_core::error::Error),
}
