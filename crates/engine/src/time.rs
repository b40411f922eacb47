use std::time::Duration;

/// Converts a seconds value into a [`Duration`].
///
/// Negative and NaN inputs map to zero; values beyond the `Duration` range
/// saturate.
///
/// # Example
/// ```
/// use std::time::Duration;
///
/// use engine::seconds_to_duration;
///
/// assert_eq!(seconds_to_duration(1.5), Duration::from_millis(1_500));
/// assert_eq!(seconds_to_duration(-3.0), Duration::ZERO);
/// ```
pub fn seconds_to_duration(seconds: f64) -> Duration {
    if seconds.is_nan() || seconds <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX)
}

/// Renders seconds as `m:ss`, flooring both parts.
///
/// # Example
/// ```
/// use engine::format_clock;
///
/// assert_eq!(format_clock(75.9), "1:15");
/// assert_eq!(format_clock(3_600.0), "60:00");
/// ```
pub fn format_clock(seconds: f64) -> String {
    let seconds = if seconds.is_finite() {
        seconds.max(0.0)
    } else {
        0.0
    };
    let minutes = (seconds / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    format!("{minutes}:{secs:02}")
}

/// Clamps a playback position into `[0, duration]`.
pub(crate) fn clamp_position(seconds: f64, duration: f64) -> f64 {
    if !seconds.is_finite() {
        return 0.0;
    }
    let upper = if duration.is_finite() {
        duration.max(0.0)
    } else {
        0.0
    };
    seconds.clamp(0.0, upper)
}
