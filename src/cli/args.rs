//! Command-line argument definitions

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, ValueEnum};

/// Upper bound accepted for `--threads`
pub const MAX_THREADS: u32 = 256;

/// Arguments for the build command
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Job description file (.json, .yaml, .yml or .toml)
    #[arg(short, long)]
    pub job: PathBuf,

    /// Directory the output file is placed in
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// How the argument list is printed
    #[arg(long, value_enum, default_value_t = OutputFormat::Lines)]
    pub format: OutputFormat,

    /// Encoder threads: a number, or `auto` for one per CPU
    #[arg(long)]
    pub threads: Option<ThreadCount>,
}

/// Arguments for the plan command
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Job description file
    #[arg(short, long)]
    pub job: PathBuf,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the validate command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Job description file
    #[arg(short, long)]
    pub job: PathBuf,
}

/// Printing style for `build`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON array of arguments
    Json,
    /// One argument per line
    Lines,
    /// A single quoted shell line
    Shell,
}

/// Thread count requested on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadCount {
    Auto,
    Fixed(u32),
}

impl ThreadCount {
    pub fn resolve(&self) -> u32 {
        match self {
            ThreadCount::Auto => u32::try_from(num_cpus::get())
                .unwrap_or(MAX_THREADS)
                .clamp(1, MAX_THREADS),
            ThreadCount::Fixed(count) => *count,
        }
    }
}

impl FromStr for ThreadCount {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.eq_ignore_ascii_case("auto") {
            return Ok(ThreadCount::Auto);
        }
        clap_num::number_range(value, 1, MAX_THREADS).map(ThreadCount::Fixed)
    }
}

impl fmt::Display for ThreadCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThreadCount::Auto => write!(f, "auto"),
            ThreadCount::Fixed(count) => write!(f, "{}", count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_count_parsing() {
        assert_eq!("auto".parse::<ThreadCount>(), Ok(ThreadCount::Auto));
        assert_eq!("AUTO".parse::<ThreadCount>(), Ok(ThreadCount::Auto));
        assert_eq!("8".parse::<ThreadCount>(), Ok(ThreadCount::Fixed(8)));
        assert!("0".parse::<ThreadCount>().is_err());
        assert!("9999".parse::<ThreadCount>().is_err());
        assert!("many".parse::<ThreadCount>().is_err());
    }

    #[test]
    fn test_auto_resolves_to_at_least_one() {
        assert!(ThreadCount::Auto.resolve() >= 1);
        assert_eq!(ThreadCount::Fixed(3).resolve(), 3);
    }
}
