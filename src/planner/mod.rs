//! Timeline planning: cumulative segment layout and gap insertion

use serde::Serialize;

use crate::domain::model::{TrackInfo, DEFAULT_GAP_DURATION};

pub mod gaps;

pub use gaps::GapProcessor;

/// Tolerance when comparing timeline positions
pub const TIME_EPSILON: f64 = 1e-6;

/// One input placed on the cumulative timeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineSegment {
    pub input: TrackInfo,
    /// Unique id, the input position for original tracks
    pub original_index: usize,
    pub start_time: f64,
    pub duration: f64,
    pub end_time: f64,
}

impl TimelineSegment {
    pub fn new(input: TrackInfo, original_index: usize, start_time: f64, duration: f64) -> Self {
        Self {
            input,
            original_index,
            start_time,
            duration,
            end_time: start_time + duration,
        }
    }

    /// Move the segment later on the timeline
    pub fn shift(&mut self, offset: f64) {
        self.start_time += offset;
        self.end_time += offset;
    }

    /// True when `time` falls strictly inside the segment
    pub fn contains(&self, time: f64) -> bool {
        time > self.start_time + TIME_EPSILON && time < self.end_time - TIME_EPSILON
    }
}

/// Contiguous, time-ordered segment list
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Timeline {
    pub segments: Vec<TimelineSegment>,
}

impl Timeline {
    /// Lay tracks end to end; each starts where the previous one ends
    pub fn from_tracks(tracks: &[TrackInfo], default_duration: f64) -> Self {
        let mut segments = Vec::with_capacity(tracks.len());
        let mut cursor = 0.0;

        for (index, track) in tracks.iter().enumerate() {
            let duration = effective_duration(track, default_duration);
            segments.push(TimelineSegment::new(track.clone(), index, cursor, duration));
            cursor += duration;
        }

        Self { segments }
    }

    pub fn total_duration(&self) -> f64 {
        self.segments.last().map(|s| s.end_time).unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Flatten back into track records
    pub fn tracks(&self) -> Vec<TrackInfo> {
        self.segments.iter().map(|s| s.input.clone()).collect()
    }
}

/// Duration a track occupies on the timeline
pub fn effective_duration(track: &TrackInfo, default_duration: f64) -> f64 {
    match track.duration {
        Some(duration) => duration,
        None if track.is_gap() => DEFAULT_GAP_DURATION,
        None => default_duration,
    }
}
