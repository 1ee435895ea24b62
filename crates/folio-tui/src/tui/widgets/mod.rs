pub mod block;
pub mod diff;
pub mod markdown;
