//! Gap insertion into the cumulative timeline

use tracing::{debug, warn};

use crate::domain::errors::JobError;
use crate::domain::model::{Gap, GapType, Gaps, TrackInfo};
use crate::planner::{Timeline, TimelineSegment, TIME_EPSILON};

/// Inserts editor gaps into a track list, splitting tracks a gap lands inside
#[derive(Debug, Clone)]
pub struct GapProcessor {
    frame_rate: f64,
    default_duration: f64,
}

impl GapProcessor {
    /// Create a processor for the given frame rate and fallback input duration
    pub fn new(frame_rate: f64, default_duration: f64) -> Result<Self, JobError> {
        if !frame_rate.is_finite() || frame_rate <= 0.0 {
            return Err(JobError::InvalidFrameRate(frame_rate));
        }
        Ok(Self {
            frame_rate,
            default_duration,
        })
    }

    /// Apply gaps and return the resulting flat track list
    pub fn process(&self, inputs: &[TrackInfo], gaps: &Gaps) -> Vec<TrackInfo> {
        self.insert_gaps(inputs, gaps).tracks()
    }

    /// Apply gaps and return the full timeline
    pub fn insert_gaps(&self, inputs: &[TrackInfo], gaps: &Gaps) -> Timeline {
        let mut timeline = Timeline::from_tracks(inputs, self.default_duration);
        let ordered = ordered_gaps(gaps);
        if ordered.is_empty() {
            return timeline;
        }

        let mut next_index = inputs.len();
        for (gap, gap_type) in ordered {
            let duration = gap.duration_seconds(self.frame_rate);
            if duration <= 0.0 {
                warn!("Skipping zero-length {:?} gap at frame {}", gap_type, gap.start_frame);
                continue;
            }

            let at = gap.start_seconds(self.frame_rate);
            self.insert_gap(&mut timeline, &gap, gap_type, at, duration, &mut next_index);
        }

        debug!(
            "Timeline after gap insertion: {} segments, {:.3}s",
            timeline.len(),
            timeline.total_duration()
        );
        timeline
    }

    fn insert_gap(
        &self,
        timeline: &mut Timeline,
        gap: &Gap,
        gap_type: GapType,
        at: f64,
        duration: f64,
        next_index: &mut usize,
    ) {
        let total = timeline.total_duration();

        let (insert_at, gap_start) = if at >= total - TIME_EPSILON {
            if at > total + TIME_EPSILON {
                warn!(
                    "Gap at {:.3}s starts after the timeline end ({:.3}s), appending",
                    at, total
                );
            }
            (timeline.segments.len(), total)
        } else if let Some(pos) = timeline.segments.iter().position(|s| s.contains(at)) {
            split_segment(timeline, pos, at, next_index);
            (pos + 1, at)
        } else {
            let pos = timeline
                .segments
                .iter()
                .position(|s| s.start_time >= at - TIME_EPSILON)
                .unwrap_or(timeline.segments.len());
            let start = timeline
                .segments
                .get(pos)
                .map(|s| s.start_time)
                .unwrap_or(total);
            (pos, start)
        };

        for segment in timeline.segments.iter_mut().skip(insert_at) {
            segment.shift(duration);
        }

        let mut track = TrackInfo::gap(gap_type, duration);
        track.start_frame = Some(gap.start_frame);

        timeline
            .segments
            .insert(insert_at, TimelineSegment::new(track, *next_index, gap_start, duration));
        *next_index += 1;

        debug!(
            "Inserted {:?} gap of {:.3}s at {:.3}s (slot {})",
            gap_type, duration, gap_start, insert_at
        );
    }
}

/// Merge both gap lists, ascending by start frame
fn ordered_gaps(gaps: &Gaps) -> Vec<(Gap, GapType)> {
    let mut ordered: Vec<(Gap, GapType)> = gaps
        .video
        .iter()
        .map(|gap| (*gap, GapType::Video))
        .chain(gaps.audio.iter().map(|gap| (*gap, GapType::Audio)))
        .collect();
    ordered.sort_by_key(|(gap, _)| gap.start_frame);
    ordered
}

/// Split the segment at `pos` so that a new segment begins exactly at `at`
fn split_segment(timeline: &mut Timeline, pos: usize, at: f64, next_index: &mut usize) {
    let original = timeline.segments[pos].clone();
    let offset = at - original.start_time;
    let remainder = original.duration - offset;

    let mut head = original.input.clone();
    let mut tail = original.input.clone();
    head.duration = Some(offset);
    tail.duration = Some(remainder);

    if !original.input.is_gap() {
        let source_start = original.input.start_time.unwrap_or(0.0);
        head.start_time = Some(source_start);
        tail.start_time = Some(source_start + offset);
    }

    timeline.segments[pos] =
        TimelineSegment::new(head, original.original_index, original.start_time, offset);
    timeline
        .segments
        .insert(pos + 1, TimelineSegment::new(tail, *next_index, at, remainder));
    *next_index += 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::GAP_SENTINEL;

    fn processor() -> GapProcessor {
        GapProcessor::new(30.0, 10.0).unwrap()
    }

    fn assert_contiguous(timeline: &Timeline) {
        for pair in timeline.segments.windows(2) {
            assert!((pair[0].end_time - pair[1].start_time).abs() < 1e-9);
        }
    }

    #[test]
    fn test_no_gaps_is_identity() {
        let inputs = vec![TrackInfo::new("a.mp4"), TrackInfo::new("b.mp4").with_duration(3.0)];
        let tracks = processor().process(&inputs, &Gaps::default());
        assert_eq!(tracks, inputs);
    }

    #[test]
    fn test_gap_inside_segment_splits_it() {
        let inputs = vec![TrackInfo::new("clip.mp4").with_duration(10.0)];
        let gaps = Gaps {
            video: vec![Gap::new(150, 30)],
            audio: vec![],
        };

        let timeline = processor().insert_gaps(&inputs, &gaps);
        assert_eq!(timeline.len(), 3);

        let head = &timeline.segments[0];
        assert_eq!(head.input.path, "clip.mp4");
        assert_eq!(head.input.start_time, Some(0.0));
        assert_eq!(head.input.duration, Some(5.0));
        assert_eq!((head.start_time, head.end_time), (0.0, 5.0));

        let gap = &timeline.segments[1];
        assert!(gap.input.is_gap());
        assert_eq!(gap.input.gap_type, Some(GapType::Video));
        assert_eq!((gap.start_time, gap.end_time), (5.0, 6.0));

        let tail = &timeline.segments[2];
        assert_eq!(tail.input.start_time, Some(5.0));
        assert_eq!(tail.input.duration, Some(5.0));
        assert_eq!((tail.start_time, tail.end_time), (6.0, 11.0));

        assert_eq!(timeline.total_duration(), 11.0);
        assert_contiguous(&timeline);
    }

    #[test]
    fn test_split_advances_existing_source_offset() {
        let inputs = vec![TrackInfo::new("clip.mp4").with_trim(20.0, 10.0)];
        let gaps = Gaps {
            video: vec![Gap::new(60, 30)],
            audio: vec![],
        };

        let tracks = processor().process(&inputs, &gaps);
        assert_eq!(tracks[0].start_time, Some(20.0));
        assert_eq!(tracks[0].duration, Some(2.0));
        assert_eq!(tracks[2].start_time, Some(22.0));
        assert_eq!(tracks[2].duration, Some(8.0));
    }

    #[test]
    fn test_gap_on_boundary_inserts_between_segments() {
        let inputs = vec![
            TrackInfo::new("a.mp4").with_duration(2.0),
            TrackInfo::new("b.mp4").with_duration(3.0),
        ];
        let gaps = Gaps {
            video: vec![Gap::new(60, 15)],
            audio: vec![],
        };

        let timeline = processor().insert_gaps(&inputs, &gaps);
        let paths: Vec<&str> = timeline.segments.iter().map(|s| s.input.path.as_str()).collect();
        assert_eq!(paths, vec!["a.mp4", GAP_SENTINEL, "b.mp4"]);
        assert_eq!(timeline.segments[2].start_time, 2.5);
        assert_eq!(timeline.segments[2].input.start_time, None);
        assert_contiguous(&timeline);
    }

    #[test]
    fn test_gap_past_end_is_appended() {
        let inputs = vec![TrackInfo::new("a.mp4").with_duration(2.0)];
        let gaps = Gaps {
            video: vec![Gap::new(300, 30)],
            audio: vec![],
        };

        let timeline = processor().insert_gaps(&inputs, &gaps);
        assert_eq!(timeline.len(), 2);
        assert!(timeline.segments[1].input.is_gap());
        assert_eq!(timeline.segments[1].start_time, 2.0);
        assert_eq!(timeline.total_duration(), 3.0);
    }

    #[test]
    fn test_zero_length_gap_is_skipped() {
        let inputs = vec![TrackInfo::new("a.mp4").with_duration(2.0)];
        let gaps = Gaps {
            video: vec![Gap::new(30, 0)],
            audio: vec![],
        };

        let tracks = processor().process(&inputs, &gaps);
        assert_eq!(tracks, inputs);
    }

    #[test]
    fn test_gaps_processed_in_chronological_order() {
        let inputs = vec![
            TrackInfo::new("a.mp4").with_duration(4.0),
            TrackInfo::new("b.mp4").with_duration(4.0),
        ];
        // Listed out of order, and split across both lists
        let gaps = Gaps {
            video: vec![Gap::new(240, 30)],
            audio: vec![Gap::new(60, 30)],
        };

        let timeline = processor().insert_gaps(&inputs, &gaps);
        let summary: Vec<(&str, Option<GapType>)> = timeline
            .segments
            .iter()
            .map(|s| (s.input.path.as_str(), s.input.gap_type))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("a.mp4", None),
                (GAP_SENTINEL, Some(GapType::Audio)),
                ("a.mp4", None),
                ("b.mp4", None),
                (GAP_SENTINEL, Some(GapType::Video)),
                ("b.mp4", None),
            ]
        );
        assert_eq!(timeline.total_duration(), 10.0);
        assert_contiguous(&timeline);
    }

    #[test]
    fn test_synthetic_indices_are_unique() {
        let inputs = vec![TrackInfo::new("a.mp4").with_duration(10.0)];
        let gaps = Gaps {
            video: vec![Gap::new(30, 30), Gap::new(120, 30)],
            audio: vec![],
        };

        let timeline = processor().insert_gaps(&inputs, &gaps);
        let mut ids: Vec<usize> = timeline.segments.iter().map(|s| s.original_index).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), timeline.len());
    }

    #[test]
    fn test_duration_round_trip() {
        let inputs = vec![
            TrackInfo::new("a.mp4").with_duration(3.5),
            TrackInfo::new(GAP_SENTINEL),
            TrackInfo::new("b.mp4"),
        ];
        let gaps = Gaps {
            video: vec![Gap::new(45, 15), Gap::new(200, 60)],
            audio: vec![Gap::new(100, 30)],
        };

        let before = Timeline::from_tracks(&inputs, 10.0).total_duration();
        let timeline = processor().insert_gaps(&inputs, &gaps);
        let inserted = (15 + 60 + 30) as f64 / 30.0;
        assert!((timeline.total_duration() - (before + inserted)).abs() < 1e-9);
        assert_contiguous(&timeline);
    }

    #[test]
    fn test_rejects_non_positive_frame_rate() {
        assert_eq!(
            GapProcessor::new(0.0, 5.0).unwrap_err(),
            JobError::InvalidFrameRate(0.0)
        );
    }
}
