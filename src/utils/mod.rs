//! Common utilities and helpers

pub mod logging;
pub mod path;
pub mod time;

pub use path::{escape_filter_path, join_output_path, subtitle_filter};
pub use time::{format_clock, format_seconds};
