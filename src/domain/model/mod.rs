// Domain models - Export job description handed over by the editor

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Reserved path marking a synthetic gap in the input list
pub const GAP_SENTINEL: &str = "__GAP__";

/// Default output frame size when the job does not specify one
pub const DEFAULT_WIDTH: u32 = 1920;
pub const DEFAULT_HEIGHT: u32 = 1080;

/// Frame rate assumed when the job does not specify one
pub const DEFAULT_FRAME_RATE: f64 = 30.0;

/// Duration of a gap input that carries no explicit duration
pub const DEFAULT_GAP_DURATION: f64 = 1.0;

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "mkv", "avi", "webm"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "aac", "flac"];
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "webp"];

/// Root export job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// Ordered timeline inputs
    pub inputs: Vec<Input>,
    /// Global operations applied to the export
    #[serde(default)]
    pub operations: Operations,
    /// Gaps placed by the editor, in frames
    #[serde(default)]
    pub gaps: Option<Gaps>,
    /// Output frame size
    #[serde(default)]
    pub video_dimensions: Option<VideoDimensions>,
    /// Output file name
    pub output: String,
}

impl Job {
    /// Create a job with default operations
    pub fn new(inputs: Vec<Input>, output: impl Into<String>) -> Self {
        Self {
            inputs,
            operations: Operations::default(),
            gaps: None,
            video_dimensions: None,
            output: output.into(),
        }
    }

    /// Output frame size, falling back to 1920x1080
    pub fn dimensions(&self) -> VideoDimensions {
        self.video_dimensions.unwrap_or_default()
    }

    /// Inputs normalized to track records
    pub fn tracks(&self) -> Vec<TrackInfo> {
        self.inputs.iter().map(Input::to_track).collect()
    }

    /// True when at least one gap is present in either list
    pub fn has_gaps(&self) -> bool {
        self.gaps
            .as_ref()
            .map(|gaps| !gaps.video.is_empty() || !gaps.audio.is_empty())
            .unwrap_or(false)
    }
}

/// A timeline input: bare path or full track record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Input {
    Path(String),
    Track(TrackInfo),
}

impl Input {
    /// Normalize into a track record
    pub fn to_track(&self) -> TrackInfo {
        match self {
            Input::Path(path) => TrackInfo::new(path.clone()),
            Input::Track(track) => track.clone(),
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Input::Path(path) => path,
            Input::Track(track) => &track.path,
        }
    }
}

impl From<&str> for Input {
    fn from(path: &str) -> Self {
        Input::Path(path.to_string())
    }
}

impl From<TrackInfo> for Input {
    fn from(track: TrackInfo) -> Self {
        Input::Track(track)
    }
}

/// Track record describing one input on the timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackInfo {
    /// Media path or [`GAP_SENTINEL`]
    pub path: String,
    /// Offset into the source media, in seconds
    #[serde(default)]
    pub start_time: Option<f64>,
    /// Duration used from the source, in seconds
    #[serde(default)]
    pub duration: Option<f64>,
    /// Explicit track type, used when the extension is not recognized
    #[serde(default)]
    pub track_type: Option<TrackType>,
    #[serde(default)]
    pub muted: bool,
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// For gap markers: which stream the gap blanks
    #[serde(default)]
    pub gap_type: Option<GapType>,
    /// Timeline frame the track starts at, when known
    #[serde(default)]
    pub start_frame: Option<u64>,
}

fn default_visible() -> bool {
    true
}

impl TrackInfo {
    /// Create a track for a path with no trim
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            start_time: None,
            duration: None,
            track_type: None,
            muted: false,
            visible: true,
            gap_type: None,
            start_frame: None,
        }
    }

    /// Create a gap marker of the given duration
    pub fn gap(gap_type: GapType, duration: f64) -> Self {
        Self {
            gap_type: Some(gap_type),
            duration: Some(duration),
            ..Self::new(GAP_SENTINEL)
        }
    }

    /// Set source offset and duration
    pub fn with_trim(mut self, start_time: f64, duration: f64) -> Self {
        self.start_time = Some(start_time);
        self.duration = Some(duration);
        self
    }

    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn muted(mut self) -> Self {
        self.muted = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn is_gap(&self) -> bool {
        self.path == GAP_SENTINEL
    }

    /// True when a source trim is requested
    pub fn has_trim(&self) -> bool {
        self.start_time.is_some() || self.duration.is_some()
    }

    /// Classify the track by sentinel, extension, then explicit type
    ///
    /// Anything still unknown is treated as video.
    pub fn kind(&self) -> MediaKind {
        if self.is_gap() {
            return MediaKind::Gap;
        }

        if let Some(kind) = self.extension_kind() {
            return kind;
        }

        match self.track_type {
            Some(TrackType::Audio) => MediaKind::Audio,
            Some(TrackType::Image) => MediaKind::Image,
            Some(TrackType::Video) | None => MediaKind::Video,
        }
    }

    /// Whether `kind()` is backed by the sentinel, the extension or an explicit type
    pub fn is_recognized(&self) -> bool {
        self.is_gap() || self.extension_kind().is_some() || self.track_type.is_some()
    }

    fn extension_kind(&self) -> Option<MediaKind> {
        let ext = Path::new(&self.path)
            .extension()?
            .to_string_lossy()
            .to_lowercase();

        if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Video)
        } else if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Audio)
        } else if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Image)
        } else {
            None
        }
    }
}

/// Explicit track type from the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackType {
    Video,
    Audio,
    Image,
}

/// Which stream a gap blanks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GapType {
    Video,
    Audio,
}

/// Classified media type of a track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Audio,
    Image,
    Gap,
}

impl MediaKind {
    /// Whether the input contributes a picture
    pub fn has_video(&self) -> bool {
        matches!(self, MediaKind::Video | MediaKind::Image)
    }

    /// Whether the input file carries a sound stream
    pub fn has_audio(&self) -> bool {
        matches!(self, MediaKind::Video | MediaKind::Audio)
    }
}

/// Global operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Operations {
    pub concat: bool,
    pub trim: Option<TrimRange>,
    pub crop: Option<CropRect>,
    /// Subtitle file burned into the picture
    pub subtitles: Option<String>,
    /// Display aspect ratio, e.g. `16:9`
    pub aspect: Option<String>,
    /// Audio file replacing the timeline's own sound
    pub replace_audio: Option<String>,
    pub normalize_frame_rate: bool,
    pub target_frame_rate: Option<f64>,
    /// x264 preset name
    pub preset: Option<String>,
    pub threads: Option<u32>,
}

impl Default for Operations {
    fn default() -> Self {
        Self {
            concat: false,
            trim: None,
            crop: None,
            subtitles: None,
            aspect: None,
            replace_audio: None,
            normalize_frame_rate: false,
            target_frame_rate: None,
            preset: None,
            threads: None,
        }
    }
}

impl Operations {
    /// Frame rate used for gap timing and fps normalization
    pub fn frame_rate(&self) -> f64 {
        self.target_frame_rate.unwrap_or(DEFAULT_FRAME_RATE)
    }
}

/// Output trim range in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrimRange {
    pub start: f64,
    #[serde(default)]
    pub end: Option<f64>,
    #[serde(default)]
    pub duration: Option<f64>,
}

/// Crop rectangle in output pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRect {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub x: u32,
    #[serde(default)]
    pub y: u32,
}

impl CropRect {
    /// Render as an FFmpeg `crop` filter
    pub fn to_filter(&self) -> String {
        format!("crop={}:{}:{}:{}", self.width, self.height, self.x, self.y)
    }
}

/// Gaps placed by the editor, split by stream
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Gaps {
    pub video: Vec<Gap>,
    pub audio: Vec<Gap>,
}

/// A gap in frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gap {
    pub start_frame: u64,
    pub length: u64,
}

impl Gap {
    pub fn new(start_frame: u64, length: u64) -> Self {
        Self { start_frame, length }
    }

    /// Start position in seconds at the given frame rate
    pub fn start_seconds(&self, frame_rate: f64) -> f64 {
        self.start_frame as f64 / frame_rate
    }

    /// Duration in seconds at the given frame rate
    pub fn duration_seconds(&self, frame_rate: f64) -> f64 {
        self.length as f64 / frame_rate
    }
}

/// Output frame size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoDimensions {
    pub width: u32,
    pub height: u32,
}

impl VideoDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for VideoDimensions {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}
