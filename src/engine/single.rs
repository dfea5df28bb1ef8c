//! Single-input workflow
//!
//! A lone track is filtered directly. A graph is only built when the track
//! itself needs trimming, hiding, muting or fps normalization; otherwise crop
//! and subtitles stay simple `-vf` filters.

use tracing::debug;

use crate::domain::rules::AudioSource;
use crate::engine::segment::{segment_audio, segment_video};
use crate::engine::steps::StepContext;
use crate::engine::{CommandPlan, Mapping, VideoChain};
use crate::error::SpliceResult;
use crate::streams::{ClassifiedInput, LabelAllocator, StreamKind};

/// Run the single-input workflow
pub fn single_workflow(ctx: &StepContext<'_>, plan: &mut CommandPlan) -> SpliceResult<()> {
    ctx.add_file_inputs(plan);

    let slots = ctx.classification.in_order();
    let Some(input) = slots.first().copied() else {
        return Ok(());
    };

    let has_video = input.kind.has_video();
    let external = matches!(plan.audio_source, AudioSource::External(_));
    if !has_video {
        plan.video_chain = VideoChain::Absent;
    }

    if !needs_graph(ctx, input) {
        debug!("Single input {} needs no filter graph", input.track.path);
        if external {
            if let (true, Some(file_index)) = (has_video, input.file_index) {
                plan.map(Mapping::Input {
                    file_index,
                    kind: StreamKind::Video,
                });
            }
            ctx.map_external_audio(plan);
        }
        return Ok(());
    }

    let mut labels = LabelAllocator::new();
    let segments = ctx.segment_context(false);

    if has_video {
        let video = segment_video(&mut labels, &segments, input);
        ctx.finish_video(&mut labels, plan, video, "null");
    }

    if external {
        ctx.map_external_audio(plan);
    } else if input.kind.has_audio() {
        let audio = segment_audio(&mut labels, &segments, input);
        ctx.finish_audio(plan, audio, "anull");
    }

    Ok(())
}

fn needs_graph(ctx: &StepContext<'_>, input: &ClassifiedInput) -> bool {
    let track = &input.track;
    let normalize = ctx.job.operations.normalize_frame_rate && input.kind.has_video();
    track.has_trim() || !track.visible || track.muted || normalize
}
