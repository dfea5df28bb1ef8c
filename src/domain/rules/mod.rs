// Domain rules - Job validation and audio routing policy

use tracing::warn;

use crate::domain::errors::JobError;
use crate::domain::model::*;
use crate::streams::Classification;
use crate::utils::path::extension_of;

/// Subtitle formats the `subtitles` filter can burn in
const SUBTITLE_EXTENSIONS: &[&str] = &["srt", "ass", "ssa", "vtt"];

/// Reject structurally invalid jobs before any command is assembled
pub fn validate_job(job: &Job) -> Result<(), JobError> {
    if job.inputs.is_empty() {
        return Err(JobError::EmptyInputs);
    }

    let tracks = job.tracks();
    if tracks.iter().all(TrackInfo::is_gap) {
        return Err(JobError::NoMediaInputs);
    }

    for track in &tracks {
        validate_track(track)?;
    }

    if let Some(dims) = job.video_dimensions {
        if dims.width == 0 || dims.height == 0 {
            return Err(JobError::InvalidDimensions {
                width: dims.width,
                height: dims.height,
            });
        }
    }

    let ops = &job.operations;
    if let Some(fps) = ops.target_frame_rate {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(JobError::InvalidFrameRate(fps));
        }
    }

    if let Some(trim) = &ops.trim {
        validate_trim(trim)?;
    }

    if let Some(crop) = &ops.crop {
        if crop.width == 0 || crop.height == 0 {
            return Err(JobError::InvalidCrop(format!(
                "size must be non-zero, got {}x{}",
                crop.width, crop.height
            )));
        }
    }

    if let Some(subtitles) = &ops.subtitles {
        let supported = extension_of(subtitles)
            .map(|ext| SUBTITLE_EXTENSIONS.contains(&ext.as_str()))
            .unwrap_or(false);
        if !supported {
            return Err(JobError::UnsupportedSubtitleFormat(subtitles.clone()));
        }
    }

    if let Some(aspect) = &ops.aspect {
        parse_aspect(aspect)?;
    }

    if ops.threads == Some(0) {
        return Err(JobError::InvalidThreads);
    }

    Ok(())
}

fn validate_track(track: &TrackInfo) -> Result<(), JobError> {
    if let Some(start) = track.start_time {
        if !start.is_finite() || start < 0.0 {
            return Err(JobError::InvalidTrim(format!(
                "{}: start time must be >= 0, got {}",
                track.path, start
            )));
        }
    }
    if let Some(duration) = track.duration {
        if !duration.is_finite() || duration <= 0.0 {
            return Err(JobError::InvalidTrim(format!(
                "{}: duration must be positive, got {}",
                track.path, duration
            )));
        }
    }
    Ok(())
}

fn validate_trim(trim: &TrimRange) -> Result<(), JobError> {
    if !trim.start.is_finite() || trim.start < 0.0 {
        return Err(JobError::InvalidTrim(format!(
            "start must be >= 0, got {}",
            trim.start
        )));
    }

    match (trim.end, trim.duration) {
        (Some(end), _) if end <= trim.start => Err(JobError::InvalidTrim(format!(
            "end ({}) must be after start ({})",
            end, trim.start
        ))),
        (None, Some(duration)) if duration <= 0.0 => Err(JobError::InvalidTrim(format!(
            "duration must be positive, got {}",
            duration
        ))),
        (None, None) => Err(JobError::InvalidTrim(
            "an end or a duration is required".to_string(),
        )),
        _ => Ok(()),
    }
}

/// Validate an aspect ratio given as `W:H` or a positive decimal
pub fn parse_aspect(aspect: &str) -> Result<String, JobError> {
    let invalid = || JobError::InvalidAspect(aspect.to_string());
    let trimmed = aspect.trim();

    let valid = match trimmed.split_once(':') {
        Some((w, h)) => matches!(
            (w.parse::<u32>(), h.parse::<u32>()),
            (Ok(w), Ok(h)) if w > 0 && h > 0
        ),
        None => trimmed
            .parse::<f64>()
            .map(|ratio| ratio.is_finite() && ratio > 0.0)
            .unwrap_or(false),
    };

    if valid {
        Ok(trimmed.to_string())
    } else {
        Err(invalid())
    }
}

/// Where the exported soundtrack comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioSource {
    /// Each timeline segment supplies its own audio; muted ones supply silence
    Segments,
    /// Audio files in the input list form the soundtrack
    ListTracks,
    /// A separate replacement file, added as the last input
    External(String),
}

impl AudioSource {
    /// True when video and audio are routed independently
    pub fn is_replacement(&self) -> bool {
        !matches!(self, AudioSource::Segments)
    }
}

/// Decide the soundtrack source
///
/// An explicit replacement wins over everything. Audio files listed in a
/// concatenated timeline come next and replace the video tracks' own sound.
/// Otherwise each segment carries its own audio.
pub fn audio_source(job: &Job, classification: &Classification) -> AudioSource {
    if let Some(path) = &job.operations.replace_audio {
        if classification.has_audio_files() {
            warn!(
                "Audio files in the input list are ignored because replacement audio {} is set",
                path
            );
        }
        return AudioSource::External(path.clone());
    }

    let concatenated = job.operations.concat || classification.has_gaps();
    if concatenated && classification.has_audio_files() {
        return AudioSource::ListTracks;
    }

    AudioSource::Segments
}
