//! Fixed step pipeline over a [`CommandPlan`]

use tracing::debug;

use crate::config::BuilderConfig;
use crate::domain::errors::JobError;
use crate::domain::model::{Job, MediaKind, TrackInfo};
use crate::domain::rules::{audio_source, parse_aspect, AudioSource};
use crate::engine::segment::{fold_video_operations, SegmentContext, SegmentStream};
use crate::engine::{concat, single, CommandPlan, InputSpec, Mapping, VideoChain};
use crate::error::SpliceResult;
use crate::streams::{Classification, LabelAllocator, StreamKind, StreamRef, OUT_AUDIO, OUT_VIDEO};
use crate::utils::{format_seconds, subtitle_filter};

/// Constant rate factor used with a preset
pub const PRESET_CRF: &str = "29";
/// Audio bitrate used with a preset
pub const PRESET_AUDIO_BITRATE: &str = "96k";

/// Everything a step may read for one build
#[derive(Debug)]
pub struct StepContext<'a> {
    pub job: &'a Job,
    pub config: &'a BuilderConfig,
    /// Tracks after gap processing
    pub tracks: Vec<TrackInfo>,
    pub classification: Classification,
}

impl<'a> StepContext<'a> {
    pub fn new(job: &'a Job, config: &'a BuilderConfig, tracks: Vec<TrackInfo>) -> Self {
        let classification = crate::streams::classify(&tracks);
        Self {
            job,
            config,
            tracks,
            classification,
        }
    }

    pub fn segment_context(&self, conform: bool) -> SegmentContext {
        SegmentContext {
            dimensions: self.job.dimensions(),
            frame_rate: self.job.operations.frame_rate(),
            normalize_fps: self.job.operations.normalize_frame_rate,
            conform,
            default_duration: self.config.default_input_duration,
        }
    }

    /// Which input workflow the Inputs step runs
    pub fn workflow(&self) -> Workflow {
        if self.classification.has_gaps() || (self.job.operations.concat && self.tracks.len() > 1) {
            Workflow::Concat
        } else if self.tracks.len() == 1 {
            Workflow::Single
        } else {
            Workflow::Passthrough
        }
    }

    /// Add one `-i` per real input, in file-index order
    pub fn add_file_inputs(&self, plan: &mut CommandPlan) {
        for input in self.classification.file_inputs() {
            let track = &input.track;
            let spec = if input.kind == MediaKind::Image {
                let duration = self.config.default_input_duration;
                let duration = track.duration.unwrap_or(duration);
                InputSpec::looped_image(track.path.clone(), &format_seconds(duration))
            } else {
                InputSpec::new(track.path.clone())
            };

            let index = plan.add_input(spec);
            debug_assert_eq!(Some(index), input.file_index);
        }
    }

    /// Crop and subtitles folded into the graph, then `final_filter` into `[outv]`
    pub fn finish_video(
        &self,
        labels: &mut LabelAllocator,
        plan: &mut CommandPlan,
        stream: SegmentStream,
        final_filter: &str,
    ) {
        let ops = &self.job.operations;
        let crop = ops.crop.map(|crop| crop.to_filter());
        let subtitles = ops
            .subtitles
            .as_deref()
            .map(|path| (path, self.config.subtitle_force_style.as_str()));

        let stream = fold_video_operations(labels, stream, crop, subtitles)
            .finish(final_filter, StreamRef::video(OUT_VIDEO));

        plan.graph.extend(stream.nodes);
        plan.map(Mapping::Graph(stream.stream));
        plan.video_chain = VideoChain::Folded;
    }

    /// Route `stream` through `final_filter` into `[outa]`
    pub fn finish_audio(&self, plan: &mut CommandPlan, stream: SegmentStream, final_filter: &str) {
        let stream = stream.finish(final_filter, StreamRef::audio(OUT_AUDIO));
        plan.graph.extend(stream.nodes);
        plan.map(Mapping::Graph(stream.stream));
    }

    /// Append the replacement soundtrack as the last input and map it
    pub fn map_external_audio(&self, plan: &mut CommandPlan) {
        if let AudioSource::External(path) = &plan.audio_source {
            let index = plan.add_input(InputSpec::new(path.clone()));
            plan.map(Mapping::Input {
                file_index: index,
                kind: StreamKind::Audio,
            });
        }
    }
}

/// Input workflow chosen from the timeline shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workflow {
    /// Segments joined by the concat filter
    Concat,
    /// One input filtered directly
    Single,
    /// Plain `-i` per file, no graph
    Passthrough,
}

/// Pipeline steps, applied in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Inputs,
    Trim,
    Crop,
    Subtitles,
    Aspect,
    ReplaceAudio,
    Preset,
    Threads,
}

impl Step {
    pub const PIPELINE: [Step; 8] = [
        Step::Inputs,
        Step::Trim,
        Step::Crop,
        Step::Subtitles,
        Step::Aspect,
        Step::ReplaceAudio,
        Step::Preset,
        Step::Threads,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Step::Inputs => "inputs",
            Step::Trim => "trim",
            Step::Crop => "crop",
            Step::Subtitles => "subtitles",
            Step::Aspect => "aspect",
            Step::ReplaceAudio => "replace-audio",
            Step::Preset => "preset",
            Step::Threads => "threads",
        }
    }

    pub fn apply(&self, ctx: &StepContext<'_>, plan: &mut CommandPlan) -> SpliceResult<()> {
        debug!("Applying step: {}", self.name());
        match self {
            Step::Inputs => apply_inputs(ctx, plan),
            Step::Trim => {
                apply_trim(ctx, plan);
                Ok(())
            }
            Step::Crop => {
                let filter = ctx.job.operations.crop.map(|crop| crop.to_filter());
                apply_video_filter(plan, "crop", filter)
            }
            Step::Subtitles => {
                let filter = ctx
                    .job
                    .operations
                    .subtitles
                    .as_deref()
                    .map(|path| subtitle_filter(path, &ctx.config.subtitle_force_style));
                apply_video_filter(plan, "subtitles", filter)
            }
            Step::Aspect => apply_aspect(ctx, plan),
            Step::ReplaceAudio => {
                apply_replace_audio(plan);
                Ok(())
            }
            Step::Preset => {
                apply_preset(ctx, plan);
                Ok(())
            }
            Step::Threads => {
                apply_threads(ctx, plan);
                Ok(())
            }
        }
    }
}

fn apply_inputs(ctx: &StepContext<'_>, plan: &mut CommandPlan) -> SpliceResult<()> {
    plan.audio_source = audio_source(ctx.job, &ctx.classification);
    if plan.audio_source.is_replacement() && !ctx.config.features.audio_replacement {
        return Err(JobError::AudioReplacementDisabled.into());
    }

    let workflow = ctx.workflow();
    debug!(
        "Workflow {:?} for {} tracks, audio from {:?}",
        workflow,
        ctx.tracks.len(),
        plan.audio_source
    );

    match workflow {
        Workflow::Concat => concat::concat_workflow(ctx, plan),
        Workflow::Single => single::single_workflow(ctx, plan),
        Workflow::Passthrough => passthrough_workflow(ctx, plan),
    }
}

fn passthrough_workflow(ctx: &StepContext<'_>, plan: &mut CommandPlan) -> SpliceResult<()> {
    ctx.add_file_inputs(plan);

    let first_video = ctx
        .classification
        .file_inputs()
        .into_iter()
        .find(|input| input.kind.has_video())
        .and_then(|input| input.file_index);

    plan.video_chain = match first_video {
        Some(_) => VideoChain::Unclaimed,
        None => VideoChain::Absent,
    };

    if let AudioSource::External(_) = plan.audio_source {
        if let Some(file_index) = first_video {
            plan.map(Mapping::Input {
                file_index,
                kind: StreamKind::Video,
            });
        }
        ctx.map_external_audio(plan);
    }

    Ok(())
}

fn apply_trim(ctx: &StepContext<'_>, plan: &mut CommandPlan) {
    if let Some(trim) = &ctx.job.operations.trim {
        plan.output_options.set("-ss", format_seconds(trim.start));
        match (trim.end, trim.duration) {
            (Some(end), _) => plan.output_options.set("-to", format_seconds(end)),
            (None, Some(duration)) => plan.output_options.set("-t", format_seconds(duration)),
            (None, None) => {}
        }
    }
}

/// Crop or subtitles: already in the graph, or a `-vf` filter
fn apply_video_filter(
    plan: &mut CommandPlan,
    operation: &'static str,
    filter: Option<String>,
) -> SpliceResult<()> {
    let Some(filter) = filter else {
        return Ok(());
    };

    match plan.video_chain {
        VideoChain::Folded => {
            debug!("{} already folded into the filter graph", operation);
            Ok(())
        }
        VideoChain::Unclaimed => {
            plan.simple_filters.push(filter);
            Ok(())
        }
        VideoChain::Absent => Err(JobError::NoVideoStream(operation).into()),
    }
}

fn apply_aspect(ctx: &StepContext<'_>, plan: &mut CommandPlan) -> SpliceResult<()> {
    if let Some(aspect) = &ctx.job.operations.aspect {
        let aspect = parse_aspect(aspect)?;
        plan.output_options.set("-aspect", aspect);
    }
    Ok(())
}

fn apply_replace_audio(plan: &mut CommandPlan) {
    if !plan.audio_source.is_replacement() {
        return;
    }

    let has_video = plan.video_chain != VideoChain::Absent;
    let options = &mut plan.output_options;
    if has_video {
        options.set("-c:v", "libx264");
    }
    options.set("-c:a", "aac");
    options.set("-avoid_negative_ts", "make_zero");
    if has_video {
        options.set("-vsync", "cfr");
    }
    options.set("-async", "1");
}

fn apply_preset(ctx: &StepContext<'_>, plan: &mut CommandPlan) {
    if !ctx.config.features.encoding {
        return;
    }
    if let Some(preset) = &ctx.job.operations.preset {
        let options = &mut plan.output_options;
        options.set("-c:v", "libx264");
        options.set("-preset", preset.clone());
        options.set("-crf", PRESET_CRF);
        options.set("-c:a", "aac");
        options.set("-b:a", PRESET_AUDIO_BITRATE);
    }
}

fn apply_threads(ctx: &StepContext<'_>, plan: &mut CommandPlan) {
    if !ctx.config.features.encoding {
        return;
    }
    if let Some(threads) = ctx.job.operations.threads {
        plan.output_options.set("-threads", threads.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{CropRect, Input, TrimRange};

    fn job(inputs: &[&str]) -> Job {
        Job::new(inputs.iter().map(|p| Input::from(*p)).collect(), "out.mp4")
    }

    #[test]
    fn test_workflow_selection() {
        let config = BuilderConfig::default();

        let single = job(&["a.mp4"]);
        let ctx = StepContext::new(&single, &config, single.tracks());
        assert_eq!(ctx.workflow(), Workflow::Single);

        let plain = job(&["a.mp4", "b.mp4"]);
        let ctx = StepContext::new(&plain, &config, plain.tracks());
        assert_eq!(ctx.workflow(), Workflow::Passthrough);

        let mut concat = job(&["a.mp4", "b.mp4"]);
        concat.operations.concat = true;
        let ctx = StepContext::new(&concat, &config, concat.tracks());
        assert_eq!(ctx.workflow(), Workflow::Concat);

        let gapped = job(&["a.mp4", crate::domain::model::GAP_SENTINEL]);
        let ctx = StepContext::new(&gapped, &config, gapped.tracks());
        assert_eq!(ctx.workflow(), Workflow::Concat);
    }

    #[test]
    fn test_trim_step_options() {
        let config = BuilderConfig::default();
        let mut job = job(&["a.mp4"]);
        job.operations.trim = Some(TrimRange { start: 1.5, end: Some(4.0), duration: None });

        let ctx = StepContext::new(&job, &config, job.tracks());
        let mut plan = CommandPlan::new("out.mp4");
        Step::Trim.apply(&ctx, &mut plan).unwrap();
        assert_eq!(plan.output_options.get("-ss"), Some("1.5"));
        assert_eq!(plan.output_options.get("-to"), Some("4"));
        assert_eq!(plan.output_options.get("-t"), None);
    }

    #[test]
    fn test_crop_on_absent_video_fails() {
        let config = BuilderConfig::default();
        let mut job = job(&["a.mp3"]);
        job.operations.crop = Some(CropRect { width: 10, height: 10, x: 0, y: 0 });

        let ctx = StepContext::new(&job, &config, job.tracks());
        let mut plan = CommandPlan::new("out.mp4");
        plan.video_chain = VideoChain::Absent;

        let err = Step::Crop.apply(&ctx, &mut plan).unwrap_err();
        assert!(err.to_string().contains("crop requested"));
    }

    #[test]
    fn test_preset_after_replacement_keeps_single_codec_flags() {
        let config = BuilderConfig::default();
        let mut job = job(&["a.mp4"]);
        job.operations.preset = Some("fast".to_string());
        job.operations.threads = Some(4);

        let ctx = StepContext::new(&job, &config, job.tracks());
        let mut plan = CommandPlan::new("out.mp4");
        plan.audio_source = AudioSource::External("voice.wav".to_string());
        for step in [Step::ReplaceAudio, Step::Preset, Step::Threads] {
            step.apply(&ctx, &mut plan).unwrap();
        }

        let args = plan.to_args().unwrap();
        assert_eq!(args.iter().filter(|a| *a == "-c:v").count(), 1);
        assert_eq!(args.iter().filter(|a| *a == "-c:a").count(), 1);
        assert_eq!(
            args,
            vec![
                "-c:v", "libx264", "-c:a", "aac", "-avoid_negative_ts", "make_zero", "-vsync",
                "cfr", "-async", "1", "-preset", "fast", "-crf", "29", "-b:a", "96k", "-threads",
                "4", "out.mp4",
            ]
        );
    }

    #[test]
    fn test_replacement_flags_without_video() {
        let config = BuilderConfig::default();
        let job = job(&["song.mp3"]);

        let ctx = StepContext::new(&job, &config, job.tracks());
        let mut plan = CommandPlan::new("out.m4a");
        plan.audio_source = AudioSource::ListTracks;
        plan.video_chain = VideoChain::Absent;
        Step::ReplaceAudio.apply(&ctx, &mut plan).unwrap();

        assert_eq!(plan.output_options.get("-c:v"), None);
        assert_eq!(plan.output_options.get("-vsync"), None);
        assert_eq!(plan.output_options.get("-c:a"), Some("aac"));
        assert_eq!(plan.output_options.get("-async"), Some("1"));
    }

    #[test]
    fn test_encoding_feature_off() {
        let mut config = BuilderConfig::default();
        config.features.encoding = false;
        let mut job = job(&["a.mp4"]);
        job.operations.preset = Some("slow".to_string());
        job.operations.threads = Some(2);

        let ctx = StepContext::new(&job, &config, job.tracks());
        let mut plan = CommandPlan::new("out.mp4");
        Step::Preset.apply(&ctx, &mut plan).unwrap();
        Step::Threads.apply(&ctx, &mut plan).unwrap();
        assert!(plan.output_options.is_empty());
    }

    #[test]
    fn test_pipeline_order() {
        let names: Vec<&str> = Step::PIPELINE.iter().map(Step::name).collect();
        assert_eq!(
            names,
            vec!["inputs", "trim", "crop", "subtitles", "aspect", "replace-audio", "preset", "threads"]
        );
    }
}
