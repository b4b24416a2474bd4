//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels.

pub mod console;
pub mod display;

pub use console::console_task;
pub use display::{display_task, Display};
