//! Embassy async tasks
//!
//! The link watcher runs as its own task; the badge loop runs on the main
//! task and yields between scheduler passes.

pub mod badge;
pub mod link;

pub use badge::run_badge;
pub use link::{link_task, LINK};
