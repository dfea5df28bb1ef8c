//! Command implementations

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::args::{BuildArgs, OutputFormat, PlanArgs, ValidateArgs};
use crate::config::SpliceConfig;
use crate::domain::model::{GapType, Job};
use crate::engine::{shell_join, CommandBuilder};
use crate::error::{SpliceError, SpliceResult};
use crate::utils::format_clock;
use crate::utils::path::extension_of;

/// Read a job description, choosing the parser by file extension
pub fn load_job(path: &Path) -> SpliceResult<Job> {
    let content = std::fs::read_to_string(path)?;
    let job_file_error = |message: String| SpliceError::JobFile {
        path: path.display().to_string(),
        message,
    };

    match extension_of(&path.to_string_lossy()).as_deref() {
        Some("json") | None => {
            serde_json::from_str(&content).map_err(|e| job_file_error(e.to_string()))
        }
        Some("yaml") | Some("yml") => {
            serde_yaml::from_str(&content).map_err(|e| job_file_error(e.to_string()))
        }
        Some("toml") => toml::from_str(&content).map_err(|e| job_file_error(e.to_string())),
        Some(other) => Err(job_file_error(format!(
            "unsupported job file extension '.{}' (expected .json, .yaml, .yml or .toml)",
            other
        ))),
    }
}

/// Execute the build command
pub fn build(args: BuildArgs, config: &SpliceConfig) -> Result<()> {
    let mut job = load_job(&args.job)
        .with_context(|| format!("Failed to load job {}", args.job.display()))?;

    if let Some(threads) = args.threads {
        let resolved = threads.resolve();
        info!("Thread count from command line: {} ({})", resolved, threads);
        job.operations.threads = Some(resolved);
    }

    let builder = CommandBuilder::new(config.builder.clone());
    let command = builder
        .build(&job, config.output_dir.as_deref())
        .context("Failed to build FFmpeg command")?;

    let rendered = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&command)?,
        OutputFormat::Lines => command.join("\n"),
        OutputFormat::Shell => shell_join(&command),
    };

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", rendered)?;
    Ok(())
}

/// Execute the plan command
pub fn plan(args: PlanArgs, config: &SpliceConfig) -> Result<()> {
    let job = load_job(&args.job)
        .with_context(|| format!("Failed to load job {}", args.job.display()))?;

    let builder = CommandBuilder::new(config.builder.clone());
    let timeline = builder.plan(&job).context("Failed to plan timeline")?;

    let mut stdout = std::io::stdout().lock();
    if args.json {
        writeln!(stdout, "{}", serde_json::to_string_pretty(&timeline)?)?;
        return Ok(());
    }

    writeln!(
        stdout,
        "{:>3}  {:<12}  {:<12}  {:<12}  {}",
        "#", "START", "END", "SOURCE", "PATH"
    )?;
    for segment in &timeline.segments {
        let source = match (segment.input.is_gap(), segment.input.start_time) {
            (true, _) => "-".to_string(),
            (false, offset) => format_clock(offset.unwrap_or(0.0)),
        };
        let path = match segment.input.gap_type {
            Some(GapType::Video) if segment.input.is_gap() => {
                format!("{} (video)", segment.input.path)
            }
            Some(GapType::Audio) if segment.input.is_gap() => {
                format!("{} (audio)", segment.input.path)
            }
            _ => segment.input.path.clone(),
        };
        writeln!(
            stdout,
            "{:>3}  {:<12}  {:<12}  {:<12}  {}",
            segment.original_index,
            format_clock(segment.start_time),
            format_clock(segment.end_time),
            source,
            path
        )?;
    }
    writeln!(stdout, "Total: {}", format_clock(timeline.total_duration()))?;
    Ok(())
}

/// Execute the validate command
pub fn validate(args: ValidateArgs, config: &SpliceConfig) -> Result<()> {
    let job = load_job(&args.job)
        .with_context(|| format!("Failed to load job {}", args.job.display()))?;

    let builder = CommandBuilder::new(config.builder.clone());
    let timeline = builder.plan(&job).context("Job is invalid")?;
    builder.build(&job, None).context("Job is invalid")?;

    let mut stdout = std::io::stdout().lock();
    writeln!(
        stdout,
        "Job is valid: {} inputs, {} timeline segments, {}",
        job.inputs.len(),
        timeline.len(),
        format_clock(timeline.total_duration())
    )?;
    Ok(())
}
