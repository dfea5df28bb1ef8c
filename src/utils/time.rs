//! Time formatting for filter arguments and timeline listings

/// Format seconds for a filter argument: up to six decimals, trailing zeros dropped
///
/// `5.0` becomes `5`, `2.50` becomes `2.5`, `1/3` becomes `0.333333`.
pub fn format_seconds(seconds: f64) -> String {
    let formatted = format!("{:.6}", seconds);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');

    match trimmed {
        "" | "-0" => "0".to_string(),
        other => other.to_string(),
    }
}

/// Format seconds as `HH:MM:SS.mmm` for human-readable output
pub fn format_clock(seconds: f64) -> String {
    let total_millis = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_millis / 3_600_000;
    let minutes = (total_millis % 3_600_000) / 60_000;
    let secs = (total_millis % 60_000) / 1000;
    let millis = total_millis % 1000;

    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, secs, millis)
}
