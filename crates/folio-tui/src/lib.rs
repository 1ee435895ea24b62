pub mod error;
pub mod tui;

pub use error::{Error, Result};

// Expose the run functions
pub use tui::{run_follow, run_reader};
