//! Stream references and input classification

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod classifier;

pub use classifier::{classify, ClassifiedInput, Classification};

/// Label of the concat filter's video output
pub const TEMP_OUT_VIDEO: &str = "temp_outv";
/// Label of the concat filter's audio output
pub const TEMP_OUT_AUDIO: &str = "temp_outa";
/// Final mapped video label
pub const OUT_VIDEO: &str = "outv";
/// Final mapped audio label
pub const OUT_AUDIO: &str = "outa";

/// Stream type carried by a filter-graph reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StreamKind {
    Video,
    Audio,
}

impl StreamKind {
    /// Stream specifier letter used in `N:v` / `N:a`
    pub fn specifier(&self) -> char {
        match self {
            StreamKind::Video => 'v',
            StreamKind::Audio => 'a',
        }
    }
}

/// A named stream inside the filter graph
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StreamRef {
    pub kind: StreamKind,
    pub label: String,
}

impl StreamRef {
    pub fn new(kind: StreamKind, label: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
        }
    }

    /// Reference to a stream of an `-i` input, e.g. `[2:a]`
    pub fn input(file_index: usize, kind: StreamKind) -> Self {
        Self::new(kind, format!("{}:{}", file_index, kind.specifier()))
    }

    pub fn video(label: impl Into<String>) -> Self {
        Self::new(StreamKind::Video, label)
    }

    pub fn audio(label: impl Into<String>) -> Self {
        Self::new(StreamKind::Audio, label)
    }

    /// Argument for `-map`
    pub fn map_arg(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for StreamRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.label)
    }
}

/// Per-call symbol table handing out unique intermediate labels
#[derive(Debug, Default)]
pub struct LabelAllocator {
    next: usize,
}

impl LabelAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh label such as `v3_trimmed`
    pub fn next(&mut self, kind: StreamKind, stem: &str) -> StreamRef {
        let id = self.next;
        self.next += 1;
        StreamRef::new(kind, format!("{}{}_{}", kind.specifier(), id, stem))
    }

    /// Number of labels allocated so far
    pub fn allocated(&self) -> usize {
        self.next
    }
}
