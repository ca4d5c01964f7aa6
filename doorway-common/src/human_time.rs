//! Clock-style time formatting for playback telemetry
//!
//! Telemetry is displayed as `M:SS` (minutes are not wrapped into hours;
//! a journey track is minutes long).

/// Format seconds as `M:SS`.
///
/// Non-finite and negative inputs (unknown duration before metadata loads)
/// render as `0:00`. Fractional seconds are truncated, matching what a
/// media element's native controls display.
///
/// # Examples
///
/// ```
/// use doorway_common::human_time::format_clock;
///
/// assert_eq!(format_clock(0.0), "0:00");
/// assert_eq!(format_clock(7.5), "0:07");
/// assert_eq!(format_clock(125.9), "2:05");
/// assert_eq!(format_clock(f64::NAN), "0:00");
/// ```
pub fn format_clock(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    let whole = seconds.floor() as u64;
    format!("{}:{:02}", whole / 60, whole % 60)
}

/// Format a `current / duration` pair for the status line
///
/// # Examples
///
/// ```
/// use doorway_common::human_time::format_progress_clock;
///
/// assert_eq!(format_progress_clock(18.2, 64.0), "0:18 / 1:04");
/// ```
pub fn format_progress_clock(current: f64, duration: f64) -> String {
    format!("{} / {}", format_clock(current), format_clock(duration))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_clock_minutes_rollover() {
        assert_eq!(format_clock(59.99), "0:59");
        assert_eq!(format_clock(60.0), "1:00");
        assert_eq!(format_clock(3600.0), "60:00");
    }

    #[test]
    fn test_format_clock_invalid_inputs() {
        assert_eq!(format_clock(f64::INFINITY), "0:00");
        assert_eq!(format_clock(-3.0), "0:00");
    }

    #[test]
    fn test_format_progress_clock_unknown_duration() {
        assert_eq!(format_progress_clock(32.0, 0.0), "0:32 / 0:00");
    }
}
