// Core folio functionality without UI dependencies

pub mod block;
pub mod content;
pub mod diff;
pub mod error;
pub mod follow;
pub mod index;
pub mod navigator;
pub mod page;
pub mod parser;
pub mod tool_output;
