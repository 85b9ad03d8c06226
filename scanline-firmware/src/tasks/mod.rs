//! Embassy tasks
//!
//! Each task runs independently and communicates with the main loop via
//! the flip engine and the burst queue.

mod screen;

pub use screen::{screen_task, Screen};
