//! Command assembly engine
//!
//! Steps fill a [`CommandPlan`] for one job; the plan is serialized once into
//! the final FFmpeg argument vector.

use tracing::warn;

use crate::domain::rules::AudioSource;
use crate::error::{SpliceError, SpliceResult};
use crate::streams::{StreamKind, StreamRef};

pub mod builder;
pub mod concat;
pub mod graph;
pub mod segment;
pub mod single;
pub mod steps;

pub use builder::{build_command, CommandBuilder};
pub use graph::{FilterGraph, FilterNode};

/// One `-i` argument with the options that must precede it
#[derive(Debug, Clone, PartialEq)]
pub struct InputSpec {
    pub options: Vec<String>,
    pub path: String,
}

impl InputSpec {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            options: Vec::new(),
            path: path.into(),
        }
    }

    /// Loop a still image for `duration` seconds
    pub fn looped_image(path: impl Into<String>, duration: &str) -> Self {
        Self {
            options: vec![
                "-loop".to_string(),
                "1".to_string(),
                "-t".to_string(),
                duration.to_string(),
            ],
            path: path.into(),
        }
    }
}

/// Target of a `-map` argument
#[derive(Debug, Clone, PartialEq)]
pub enum Mapping {
    /// Labeled filter-graph output, rendered `[outv]`
    Graph(StreamRef),
    /// Stream of an input file, rendered `1:a`
    Input { file_index: usize, kind: StreamKind },
}

impl Mapping {
    pub fn to_arg(&self) -> String {
        match self {
            Mapping::Graph(stream) => stream.map_arg(),
            Mapping::Input { file_index, kind } => format!("{}:{}", file_index, kind.specifier()),
        }
    }
}

/// Output options keyed by flag; setting a flag twice replaces the value in place
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputOptions {
    entries: Vec<(String, String)>,
}

impl OutputOptions {
    pub fn set(&mut self, flag: &str, value: impl Into<String>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| existing == flag) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((flag.to_string(), value)),
        }
    }

    pub fn get(&self, flag: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == flag)
            .map(|(_, value)| value.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push_args(&self, args: &mut Vec<String>) {
        for (flag, value) in &self.entries {
            args.push(flag.clone());
            args.push(value.clone());
        }
    }
}

/// Who handles crop and subtitle burn-in for the produced video
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoChain {
    /// No graph touches the video; operations go to `-vf`
    Unclaimed,
    /// Operations were folded into the filter graph
    Folded,
    /// The job produces no video stream
    Absent,
}

/// Accumulated command for one build call
#[derive(Debug, Clone)]
pub struct CommandPlan {
    pub inputs: Vec<InputSpec>,
    pub graph: FilterGraph,
    /// Simple per-output video filters, emitted as `-vf`
    pub simple_filters: Vec<String>,
    pub maps: Vec<Mapping>,
    pub output_options: OutputOptions,
    pub output: String,
    pub video_chain: VideoChain,
    pub audio_source: AudioSource,
}

impl CommandPlan {
    pub fn new(output: impl Into<String>) -> Self {
        Self {
            inputs: Vec::new(),
            graph: FilterGraph::new(),
            simple_filters: Vec::new(),
            maps: Vec::new(),
            output_options: OutputOptions::default(),
            output: output.into(),
            video_chain: VideoChain::Unclaimed,
            audio_source: AudioSource::Segments,
        }
    }

    /// Add an input and return its file index
    pub fn add_input(&mut self, input: InputSpec) -> usize {
        self.inputs.push(input);
        self.inputs.len() - 1
    }

    pub fn map(&mut self, mapping: Mapping) {
        self.maps.push(mapping);
    }

    /// Serialize into the final argument vector
    ///
    /// Order: inputs, filters, maps, output options, output path. Fails before
    /// producing any token if both `-vf` and `-filter_complex` would be needed.
    pub fn to_args(&self) -> SpliceResult<Vec<String>> {
        let complex = self.graph.render();
        let simple = self.simple_filters.join(",");

        if !complex.is_empty() && !simple.is_empty() {
            return Err(SpliceError::FilterConflict { simple, complex });
        }

        let undefined = self.graph.undefined_references();
        if !undefined.is_empty() {
            warn!("Filter graph references undefined labels: {:?}", undefined);
        }

        let mut args = Vec::new();
        for input in &self.inputs {
            args.extend(input.options.iter().cloned());
            args.push("-i".to_string());
            args.push(input.path.clone());
        }

        if !complex.is_empty() {
            args.push("-filter_complex".to_string());
            args.push(complex);
        } else if !simple.is_empty() {
            args.push("-vf".to_string());
            args.push(simple);
        }

        for mapping in &self.maps {
            args.push("-map".to_string());
            args.push(mapping.to_arg());
        }

        self.output_options.push_args(&mut args);
        args.push(self.output.clone());

        Ok(args)
    }
}

/// Join arguments into a copy-pasteable shell line, for diagnostics only
pub fn shell_join(args: &[String]) -> String {
    std::iter::once("ffmpeg".to_string())
        .chain(args.iter().map(|arg| shell_quote(arg)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=,+@%".contains(c));

    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', "'\\''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_options_replace_in_place() {
        let mut options = OutputOptions::default();
        options.set("-c:v", "libx264");
        options.set("-c:a", "aac");
        options.set("-c:v", "libx265");

        let mut args = Vec::new();
        options.push_args(&mut args);
        assert_eq!(args, vec!["-c:v", "libx265", "-c:a", "aac"]);
        assert_eq!(options.get("-c:a"), Some("aac"));
    }

    #[test]
    fn test_serialization_order() {
        let mut plan = CommandPlan::new("out.mp4");
        plan.add_input(InputSpec::looped_image("still.png", "3"));
        plan.add_input(InputSpec::new("a.mp4"));
        plan.simple_filters.push("crop=10:10:0:0".to_string());
        plan.map(Mapping::Input { file_index: 1, kind: StreamKind::Audio });
        plan.output_options.set("-threads", "2");

        let args = plan.to_args().unwrap();
        assert_eq!(
            args,
            vec![
                "-loop", "1", "-t", "3", "-i", "still.png", "-i", "a.mp4", "-vf",
                "crop=10:10:0:0", "-map", "1:a", "-threads", "2", "out.mp4",
            ]
        );
    }

    #[test]
    fn test_conflicting_filters_rejected() {
        let mut plan = CommandPlan::new("out.mp4");
        plan.add_input(InputSpec::new("a.mp4"));
        plan.graph.push(FilterNode::chain(
            StreamRef::input(0, StreamKind::Video),
            "null",
            StreamRef::video("outv"),
        ));
        plan.simple_filters.push("hflip".to_string());

        match plan.to_args() {
            Err(SpliceError::FilterConflict { simple, complex }) => {
                assert_eq!(simple, "hflip");
                assert_eq!(complex, "[0:v]null[outv]");
            }
            other => panic!("expected conflict, got {:?}", other),
        }
    }

    #[test]
    fn test_shell_join_quotes_when_needed() {
        let args = vec![
            "-i".to_string(),
            "my clip.mp4".to_string(),
            "-filter_complex".to_string(),
            "[0:v]null[outv]".to_string(),
        ];
        assert_eq!(
            shell_join(&args),
            "ffmpeg -i 'my clip.mp4' -filter_complex '[0:v]null[outv]'"
        );
    }
}
