// Domain errors - Reasons a job description is rejected

use std::fmt;

/// Validation failures for a timeline export job
#[derive(Debug, Clone, PartialEq)]
pub enum JobError {
    /// The job lists no inputs at all
    EmptyInputs,
    /// Every input is a gap marker
    NoMediaInputs,
    /// Frame rate is zero, negative or not finite
    InvalidFrameRate(f64),
    /// Output dimensions contain a zero
    InvalidDimensions { width: u32, height: u32 },
    /// Trim range is malformed
    InvalidTrim(String),
    /// Crop rectangle is malformed
    InvalidCrop(String),
    /// Subtitle file cannot be burned in
    UnsupportedSubtitleFormat(String),
    /// Aspect string is not `W:H` or a decimal ratio
    InvalidAspect(String),
    /// Thread count of zero
    InvalidThreads,
    /// A video operation was requested on a job without video
    NoVideoStream(&'static str),
    /// Job needs a separate soundtrack but the feature is switched off
    AudioReplacementDisabled,
}

impl fmt::Display for JobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobError::EmptyInputs => write!(f, "job has no inputs"),
            JobError::NoMediaInputs => write!(f, "job has no media inputs, only gaps"),
            JobError::InvalidFrameRate(fps) => {
                write!(f, "target frame rate must be positive, got {}", fps)
            }
            JobError::InvalidDimensions { width, height } => {
                write!(f, "video dimensions must be non-zero, got {}x{}", width, height)
            }
            JobError::InvalidTrim(msg) => write!(f, "invalid trim: {}", msg),
            JobError::InvalidCrop(msg) => write!(f, "invalid crop: {}", msg),
            JobError::UnsupportedSubtitleFormat(path) => {
                write!(f, "unsupported subtitle file (expected .srt, .ass, .ssa or .vtt): {}", path)
            }
            JobError::InvalidAspect(aspect) => write!(f, "invalid aspect ratio: {}", aspect),
            JobError::InvalidThreads => write!(f, "thread count must be at least 1"),
            JobError::NoVideoStream(op) => {
                write!(f, "{} requested but the job produces no video stream", op)
            }
            JobError::AudioReplacementDisabled => write!(
                f,
                "job needs a separate audio track but audio replacement is disabled"
            ),
        }
    }
}

impl std::error::Error for JobError {}
