//! Per-segment filter generators
//!
//! Each generator returns the labeled stream it produces together with the
//! filter nodes that must precede any use of that label.

use crate::domain::model::{MediaKind, TrackInfo, VideoDimensions};
use crate::engine::graph::FilterNode;
use crate::planner::effective_duration;
use crate::streams::{ClassifiedInput, LabelAllocator, StreamKind, StreamRef};
use crate::utils::{format_seconds, subtitle_filter};

/// Sample rate of synthesized and conformed audio
pub const AUDIO_SAMPLE_RATE: u32 = 48_000;
/// Channel layout of synthesized and conformed audio
pub const AUDIO_CHANNEL_LAYOUT: &str = "stereo";

pub const RESET_VIDEO_PTS: &str = "setpts=PTS-STARTPTS";
pub const RESET_AUDIO_PTS: &str = "asetpts=PTS-STARTPTS";

/// A labeled stream and the nodes that produce it
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentStream {
    pub stream: StreamRef,
    pub nodes: Vec<FilterNode>,
}

impl SegmentStream {
    /// Use an existing stream unchanged
    pub fn passthrough(stream: StreamRef) -> Self {
        Self {
            stream,
            nodes: Vec::new(),
        }
    }

    /// Start from a source filter with no inputs
    pub fn source(labels: &mut LabelAllocator, kind: StreamKind, stem: &str, filter: String) -> Self {
        let stream = labels.next(kind, stem);
        Self {
            nodes: vec![FilterNode::source(filter, stream.clone())],
            stream,
        }
    }

    /// Append a filter to the chain under a fresh label
    pub fn then(self, labels: &mut LabelAllocator, stem: &str, filter: impl Into<String>) -> Self {
        let output = labels.next(self.stream.kind, stem);
        self.finish(filter, output)
    }

    /// Append a filter whose output is a fixed label
    pub fn finish(mut self, filter: impl Into<String>, output: StreamRef) -> Self {
        self.nodes
            .push(FilterNode::chain(self.stream.clone(), filter, output.clone()));
        self.stream = output;
        self
    }
}

/// Settings shared by every segment of one build
#[derive(Debug, Clone)]
pub struct SegmentContext {
    pub dimensions: VideoDimensions,
    pub frame_rate: f64,
    pub normalize_fps: bool,
    /// Scale and pad every segment to the output geometry
    pub conform: bool,
    pub default_duration: f64,
}

impl SegmentContext {
    pub fn duration_of(&self, track: &TrackInfo) -> f64 {
        effective_duration(track, self.default_duration)
    }
}

fn trim_args(track: &TrackInfo) -> String {
    let start = format_seconds(track.start_time.unwrap_or(0.0));
    match track.duration {
        Some(duration) => format!("start={}:duration={}", start, format_seconds(duration)),
        None => format!("start={}", start),
    }
}

/// Trim a video stream and reset its timestamps; passthrough without trim
pub fn video_trim(labels: &mut LabelAllocator, source: StreamRef, track: &TrackInfo) -> SegmentStream {
    if !track.has_trim() {
        return SegmentStream::passthrough(source);
    }

    SegmentStream::passthrough(source)
        .then(labels, "trim", format!("trim={}", trim_args(track)))
        .then(labels, "trimmed", RESET_VIDEO_PTS)
}

/// Trim an audio stream; timestamps are reset even when nothing is trimmed
pub fn audio_trim(labels: &mut LabelAllocator, source: StreamRef, track: &TrackInfo) -> SegmentStream {
    let stream = SegmentStream::passthrough(source);
    let stream = if track.has_trim() {
        stream.then(labels, "atrim", format!("atrim={}", trim_args(track)))
    } else {
        stream
    };
    stream.then(labels, "trimmed", RESET_AUDIO_PTS)
}

/// Black frames standing in for a gap
pub fn gap_video(labels: &mut LabelAllocator, duration: f64, ctx: &SegmentContext) -> SegmentStream {
    let filter = format!(
        "color=black:size={}x{}:duration={}:rate={}",
        ctx.dimensions.width,
        ctx.dimensions.height,
        format_seconds(duration),
        format_seconds(ctx.frame_rate)
    );
    SegmentStream::source(labels, StreamKind::Video, "gap", filter).then(
        labels,
        "gap_reset",
        RESET_VIDEO_PTS,
    )
}

/// Silence for a gap or a muted track
pub fn silent_audio(labels: &mut LabelAllocator, duration: f64) -> SegmentStream {
    let filter = format!(
        "anullsrc=channel_layout={}:sample_rate={}:duration={}",
        AUDIO_CHANNEL_LAYOUT,
        AUDIO_SAMPLE_RATE,
        format_seconds(duration)
    );
    SegmentStream::source(labels, StreamKind::Audio, "silence", filter).then(
        labels,
        "silence_reset",
        RESET_AUDIO_PTS,
    )
}

/// Resample to a constant frame rate; must follow any trim
pub fn fps_normalize(labels: &mut LabelAllocator, input: SegmentStream, frame_rate: f64) -> SegmentStream {
    input.then(
        labels,
        "fps",
        format!("fps={}:start_time=0", format_seconds(frame_rate)),
    )
}

/// Fit a stream into the output frame, letterboxing as needed
pub fn conform_video(labels: &mut LabelAllocator, input: SegmentStream, dimensions: VideoDimensions) -> SegmentStream {
    let (w, h) = (dimensions.width, dimensions.height);
    input.then(
        labels,
        "scaled",
        format!(
            "scale={w}:{h}:force_original_aspect_ratio=decrease,pad={w}:{h}:(ow-iw)/2:(oh-ih)/2,setsar=1"
        ),
    )
}

/// Bring audio to the common sample rate and layout
pub fn conform_audio(labels: &mut LabelAllocator, input: SegmentStream) -> SegmentStream {
    input.then(
        labels,
        "aformat",
        format!(
            "aformat=sample_rates={}:channel_layouts={}",
            AUDIO_SAMPLE_RATE, AUDIO_CHANNEL_LAYOUT
        ),
    )
}

/// Blank out a hidden track
///
/// A known duration yields a black source of that length; otherwise the
/// picture is painted over so the stream keeps its own length.
pub fn hidden_video(
    labels: &mut LabelAllocator,
    input: SegmentStream,
    duration: Option<f64>,
    ctx: &SegmentContext,
) -> SegmentStream {
    match duration {
        Some(duration) => gap_video(labels, duration, ctx),
        None => input.then(labels, "hidden", "drawbox=x=0:y=0:w=iw:h=ih:color=black:t=fill"),
    }
}

/// Silence a muted track, by replacement when its length is known
pub fn muted_audio(labels: &mut LabelAllocator, input: SegmentStream, duration: Option<f64>) -> SegmentStream {
    match duration {
        Some(duration) => silent_audio(labels, duration),
        None => input.then(labels, "muted", "volume=0"),
    }
}

/// Video stream for one timeline slot: trim, fps-normalize, hide, conform
pub fn segment_video(labels: &mut LabelAllocator, ctx: &SegmentContext, input: &ClassifiedInput) -> SegmentStream {
    let track = &input.track;

    let file_index = match (input.kind, input.file_index) {
        (MediaKind::Video | MediaKind::Image, Some(index)) => index,
        _ => return gap_video(labels, ctx.duration_of(track), ctx),
    };

    if !track.visible && track.duration.is_some() {
        // Nothing from the source survives, skip its chain entirely
        let source = SegmentStream::passthrough(StreamRef::input(file_index, StreamKind::Video));
        return hidden_video(labels, source, track.duration, ctx);
    }

    let source = StreamRef::input(file_index, StreamKind::Video);
    let mut stream = match input.kind {
        // Looped stills are cut to length by `-t` and have no source offset
        MediaKind::Image => SegmentStream::passthrough(source),
        _ => video_trim(labels, source, track),
    };
    if ctx.normalize_fps {
        stream = fps_normalize(labels, stream, ctx.frame_rate);
    }
    if !track.visible {
        stream = hidden_video(labels, stream, None, ctx);
    }
    if ctx.conform {
        stream = conform_video(labels, stream, ctx.dimensions);
    }
    stream
}

/// Audio stream for one timeline slot; gaps, images and muted tracks give silence
pub fn segment_audio(labels: &mut LabelAllocator, ctx: &SegmentContext, input: &ClassifiedInput) -> SegmentStream {
    let track = &input.track;

    let file_index = match (input.kind, input.file_index) {
        (MediaKind::Video | MediaKind::Audio, Some(index)) => index,
        _ => return silent_audio(labels, ctx.duration_of(track)),
    };

    if track.muted && track.duration.is_some() {
        return silent_audio(labels, ctx.duration_of(track));
    }

    let mut stream = audio_trim(labels, StreamRef::input(file_index, StreamKind::Audio), track);
    if track.muted {
        stream = muted_audio(labels, stream, None);
    }
    if ctx.conform {
        stream = conform_audio(labels, stream);
    }
    stream
}

/// Crop then burn subtitles onto a video stream
pub fn fold_video_operations(
    labels: &mut LabelAllocator,
    mut stream: SegmentStream,
    crop: Option<String>,
    subtitles: Option<(&str, &str)>,
) -> SegmentStream {
    if let Some(crop) = crop {
        stream = stream.then(labels, "cropped", crop);
    }
    if let Some((path, force_style)) = subtitles {
        stream = stream.then(labels, "subtitled", subtitle_filter(path, force_style));
    }
    stream
}
