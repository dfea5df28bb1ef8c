//! Path handling for filter literals and output locations

use std::path::Path;

/// Escape a path for use inside a quoted filter argument
///
/// Backslashes become forward slashes so Windows paths survive the filter
/// parser, then colons (drive letters) and single quotes are escaped.
pub fn escape_filter_path(path: &str) -> String {
    path.replace('\\', "/")
        .replace('\'', "'\\''")
        .replace(':', "\\:")
}

/// Build a `subtitles` burn-in filter for the given file
pub fn subtitle_filter(path: &str, force_style: &str) -> String {
    let escaped = escape_filter_path(path);
    if force_style.is_empty() {
        format!("subtitles='{}'", escaped)
    } else {
        format!("subtitles='{}':force_style='{}'", escaped, force_style)
    }
}

/// Resolve the output path, placing it under `output_dir` when given
pub fn join_output_path(output: &str, output_dir: Option<&Path>) -> String {
    match output_dir {
        Some(dir) if !dir.as_os_str().is_empty() => {
            dir.join(output).to_string_lossy().into_owned()
        }
        _ => output.to_string(),
    }
}

/// Lowercased extension of a path, if any
pub fn extension_of(path: &str) -> Option<String> {
    Path::new(path)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
}
