//! Splice - timeline export command builder
//!
//! Translates a video editor's timeline job (tracks with trims, gaps, mutes,
//! visibility, concatenation, subtitle burn-in, crop, aspect and audio
//! replacement) into the ordered argument list of an FFmpeg invocation.
//!
//! The builder is a pure computation: it performs no I/O, spawns no process
//! and keeps no state between calls.
//!
//! ```no_run
//! use splice_cli::{build_command, Job};
//!
//! let mut job = Job::new(vec!["a.mp4".into(), "b.mp4".into()], "out.mp4");
//! job.operations.concat = true;
//! let args = build_command(&job, None).unwrap();
//! assert_eq!(args.last().map(String::as_str), Some("out.mp4"));
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod planner;
pub mod streams;
pub mod utils;

// Re-export commonly used types
pub use config::{BuilderConfig, BuilderFeatures, SpliceConfig};
pub use domain::errors::JobError;
pub use domain::model::{Gap, Gaps, Input, Job, Operations, TrackInfo, VideoDimensions};
pub use engine::{build_command, CommandBuilder};
pub use error::{SpliceError, SpliceResult};
pub use planner::{GapProcessor, Timeline, TimelineSegment};
