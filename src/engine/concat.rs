//! Concatenation assembler
//!
//! Joins per-segment streams with the `concat` filter. Pads must be
//! interleaved per segment (`[v0][a0][v1][a1]...`), otherwise FFmpeg pairs the
//! wrong streams without reporting an error.

use tracing::debug;

use crate::domain::rules::AudioSource;
use crate::engine::graph::FilterNode;
use crate::engine::segment::{
    segment_audio, segment_video, SegmentContext, SegmentStream, RESET_AUDIO_PTS, RESET_VIDEO_PTS,
};
use crate::engine::steps::StepContext;
use crate::engine::{CommandPlan, Mapping, VideoChain};
use crate::error::SpliceResult;
use crate::streams::{
    ClassifiedInput, LabelAllocator, StreamKind, StreamRef, TEMP_OUT_AUDIO, TEMP_OUT_VIDEO,
};

/// Build the `concat` filter arguments
pub fn concat_filter(segments: usize, video: bool, audio: bool) -> String {
    format!(
        "concat=n={}:v={}:a={}:unsafe=1",
        segments,
        u8::from(video),
        u8::from(audio)
    )
}

/// Concat node joining interleaved video/audio pairs
pub fn interleaved_concat(pairs: Vec<(StreamRef, StreamRef)>) -> FilterNode {
    let segments = pairs.len();
    let inputs = pairs
        .into_iter()
        .flat_map(|(video, audio)| [video, audio])
        .collect();

    FilterNode::new(
        inputs,
        concat_filter(segments, true, true),
        vec![StreamRef::video(TEMP_OUT_VIDEO), StreamRef::audio(TEMP_OUT_AUDIO)],
    )
}

/// Concat node over streams of a single kind
pub fn single_kind_concat(kind: StreamKind, streams: Vec<StreamRef>) -> FilterNode {
    let segments = streams.len();
    let (filter, output) = match kind {
        StreamKind::Video => (concat_filter(segments, true, false), StreamRef::video(TEMP_OUT_VIDEO)),
        StreamKind::Audio => (concat_filter(segments, false, true), StreamRef::audio(TEMP_OUT_AUDIO)),
    };
    FilterNode::new(streams, filter, vec![output])
}

/// Run the concatenation workflow
pub fn concat_workflow(ctx: &StepContext<'_>, plan: &mut CommandPlan) -> SpliceResult<()> {
    ctx.add_file_inputs(plan);

    let mut labels = LabelAllocator::new();
    let segments = ctx.segment_context(true);

    if plan.audio_source.is_replacement() {
        concat_video_only(ctx, &mut labels, &segments, plan);
        match plan.audio_source.clone() {
            AudioSource::External(_) => ctx.map_external_audio(plan),
            AudioSource::ListTracks => list_audio(ctx, &mut labels, &segments, plan),
            AudioSource::Segments => {}
        }
    } else {
        concat_segments(ctx, &mut labels, &segments, plan);
    }

    debug!(
        "Concatenation graph: {} nodes, {} labels allocated",
        plan.graph.len(),
        labels.allocated()
    );
    Ok(())
}

/// Every timeline slot contributes one video and one audio stream
fn concat_segments(
    ctx: &StepContext<'_>,
    labels: &mut LabelAllocator,
    segments: &SegmentContext,
    plan: &mut CommandPlan,
) {
    let mut pairs = Vec::new();

    for slot in ctx.classification.in_order() {
        let video = segment_video(labels, segments, slot);
        let audio = segment_audio(labels, segments, slot);
        plan.graph.extend(video.nodes);
        plan.graph.extend(audio.nodes);
        pairs.push((video.stream, audio.stream));
    }

    plan.graph.push(interleaved_concat(pairs));

    let video = SegmentStream::passthrough(StreamRef::video(TEMP_OUT_VIDEO));
    ctx.finish_video(labels, plan, video, RESET_VIDEO_PTS);

    let audio = SegmentStream::passthrough(StreamRef::audio(TEMP_OUT_AUDIO));
    ctx.finish_audio(plan, audio, RESET_AUDIO_PTS);
}

/// Video slots only; the soundtrack is routed separately
fn concat_video_only(
    ctx: &StepContext<'_>,
    labels: &mut LabelAllocator,
    segments: &SegmentContext,
    plan: &mut CommandPlan,
) {
    let slots = &ctx.classification.video;
    if slots.is_empty() {
        plan.video_chain = VideoChain::Absent;
        return;
    }

    let streams = build_streams(slots, plan, |slot| segment_video(labels, segments, slot));
    plan.graph.push(single_kind_concat(StreamKind::Video, streams));

    let video = SegmentStream::passthrough(StreamRef::video(TEMP_OUT_VIDEO));
    ctx.finish_video(labels, plan, video, RESET_VIDEO_PTS);
}

/// Soundtrack from the audio files (and audio gaps) in the input list
fn list_audio(
    ctx: &StepContext<'_>,
    labels: &mut LabelAllocator,
    segments: &SegmentContext,
    plan: &mut CommandPlan,
) {
    let slots = &ctx.classification.audio;

    if let [only] = slots.as_slice() {
        if let Some(file_index) = only.file_index {
            if !only.track.has_trim() && !only.track.muted {
                plan.map(Mapping::Input {
                    file_index,
                    kind: StreamKind::Audio,
                });
                return;
            }
        }
    }

    if slots.is_empty() {
        return;
    }

    let streams = build_streams(slots, plan, |slot| segment_audio(labels, segments, slot));
    plan.graph.push(single_kind_concat(StreamKind::Audio, streams));

    let audio = SegmentStream::passthrough(StreamRef::audio(TEMP_OUT_AUDIO));
    ctx.finish_audio(plan, audio, RESET_AUDIO_PTS);
}

fn build_streams<F>(slots: &[ClassifiedInput], plan: &mut CommandPlan, mut generate: F) -> Vec<StreamRef>
where
    F: FnMut(&ClassifiedInput) -> SegmentStream,
{
    let mut streams = Vec::with_capacity(slots.len());
    for slot in slots {
        let segment = generate(slot);
        plan.graph.extend(segment.nodes);
        streams.push(segment.stream);
    }
    streams
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concat_filter_flags() {
        assert_eq!(concat_filter(3, true, true), "concat=n=3:v=1:a=1:unsafe=1");
        assert_eq!(concat_filter(2, true, false), "concat=n=2:v=1:a=0:unsafe=1");
        assert_eq!(concat_filter(4, false, true), "concat=n=4:v=0:a=1:unsafe=1");
    }

    #[test]
    fn test_interleaving() {
        let node = interleaved_concat(vec![
            (StreamRef::video("v0"), StreamRef::audio("a0")),
            (StreamRef::video("v1"), StreamRef::audio("a1")),
        ]);
        assert_eq!(
            node.to_string(),
            "[v0][a0][v1][a1]concat=n=2:v=1:a=1:unsafe=1[temp_outv][temp_outa]"
        );
    }

    #[test]
    fn test_audio_only_concat() {
        let node = single_kind_concat(
            StreamKind::Audio,
            vec![StreamRef::audio("x"), StreamRef::audio("y")],
        );
        assert_eq!(node.to_string(), "[x][y]concat=n=2:v=0:a=1:unsafe=1[temp_outa]");
    }
}
