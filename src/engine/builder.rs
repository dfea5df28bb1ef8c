//! Command builder entry point

use std::path::Path;

use tracing::{debug, info, warn};

use crate::config::BuilderConfig;
use crate::domain::model::Job;
use crate::domain::rules::validate_job;
use crate::engine::steps::{Step, StepContext};
use crate::engine::{shell_join, CommandPlan};
use crate::error::SpliceResult;
use crate::planner::{GapProcessor, Timeline};
use crate::utils::join_output_path;

/// Translates jobs into FFmpeg argument vectors
///
/// Holds configuration only; every call builds its own plan, so one builder
/// can serve concurrent callers.
#[derive(Debug, Clone, Default)]
pub struct CommandBuilder {
    config: BuilderConfig,
}

impl CommandBuilder {
    pub fn new(config: BuilderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Validate the job and lay out its timeline, gaps included
    pub fn plan(&self, job: &Job) -> SpliceResult<Timeline> {
        validate_job(job)?;

        let tracks = job.tracks();
        let default_duration = self.config.default_input_duration;

        let gaps = match &job.gaps {
            Some(gaps) if job.has_gaps() && self.config.features.gaps => gaps,
            Some(_) if job.has_gaps() => {
                warn!("Gap support is disabled, ignoring job gaps");
                return Ok(Timeline::from_tracks(&tracks, default_duration));
            }
            _ => return Ok(Timeline::from_tracks(&tracks, default_duration)),
        };

        let processor = GapProcessor::new(job.operations.frame_rate(), default_duration)?;
        Ok(processor.insert_gaps(&tracks, gaps))
    }

    /// Build the full argument list, without the executable name
    pub fn build(&self, job: &Job, output_dir: Option<&Path>) -> SpliceResult<Vec<String>> {
        let timeline = self.plan(job)?;
        let ctx = StepContext::new(job, &self.config, timeline.tracks());
        let mut plan = CommandPlan::new(join_output_path(&job.output, output_dir));

        for step in Step::PIPELINE {
            step.apply(&ctx, &mut plan)?;
        }

        let args = plan.to_args()?;

        if !plan.graph.is_empty() {
            debug!("Filter graph: {}", plan.graph);
        }
        info!("FFmpeg command: {}", shell_join(&args));

        Ok(args)
    }
}

/// Build a command with the default configuration
pub fn build_command(job: &Job, output_dir: Option<&Path>) -> SpliceResult<Vec<String>> {
    CommandBuilder::default().build(job, output_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::JobError;
    use crate::domain::model::{Gap, Gaps, Input, TrackInfo};
    use crate::error::SpliceError;

    #[test]
    fn test_plan_without_gaps_keeps_inputs() {
        let job = Job::new(vec!["a.mp4".into(), "b.mp4".into()], "out.mp4");
        let timeline = CommandBuilder::default().plan(&job).unwrap();
        assert_eq!(timeline.len(), 2);
        assert_eq!(timeline.total_duration(), 10.0);
    }

    #[test]
    fn test_plan_ignores_gaps_when_disabled() {
        let mut config = BuilderConfig::default();
        config.features.gaps = false;

        let mut job = Job::new(vec![Input::from(TrackInfo::new("a.mp4").with_duration(4.0))], "out.mp4");
        job.gaps = Some(Gaps { video: vec![Gap::new(30, 30)], audio: vec![] });

        let timeline = CommandBuilder::new(config).plan(&job).unwrap();
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline.total_duration(), 4.0);
    }

    #[test]
    fn test_plan_validates_first() {
        let job = Job::new(vec![], "out.mp4");
        assert!(matches!(
            CommandBuilder::default().plan(&job),
            Err(SpliceError::InvalidJob(JobError::EmptyInputs))
        ));
    }

    #[test]
    fn test_replacement_disabled() {
        let mut config = BuilderConfig::default();
        config.features.audio_replacement = false;

        let mut job = Job::new(
            vec!["video1.mp4".into(), "audio1.mp3".into(), "video2.mp4".into()],
            "out.mp4",
        );
        job.operations.concat = true;

        assert!(matches!(
            CommandBuilder::new(config).build(&job, None),
            Err(SpliceError::InvalidJob(JobError::AudioReplacementDisabled))
        ));
    }

    #[test]
    fn test_output_dir_joined() {
        let job = Job::new(vec!["a.mp4".into(), "b.mp4".into()], "out.mp4");
        let args = build_command(&job, Some(Path::new("/exports"))).unwrap();
        assert_eq!(args.last().map(String::as_str), Some("/exports/out.mp4"));
    }
}
