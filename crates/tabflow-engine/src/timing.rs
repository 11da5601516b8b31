//! Elapsed-time formatting for component completion log lines.

use std::time::Duration;

/// Format a duration as the largest applicable units down to millis,
/// e.g. `2m, 3s, 45ms`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total_secs = elapsed.as_secs();
    let days = total_secs / 86_400;
    let hours = (total_secs % 86_400) / 3_600;
    let minutes = (total_secs % 3_600) / 60;
    let seconds = total_secs % 60;
    let millis = elapsed.subsec_millis();

    if days > 0 {
        format!("{days}d, {hours}h, {minutes}m, {seconds}s, {millis}ms")
    } else if hours > 0 {
        format!("{hours}h, {minutes}m, {seconds}s, {millis}ms")
    } else if minutes > 0 {
        format!("{minutes}m, {seconds}s, {millis}ms")
    } else if seconds > 0 {
        format!("{seconds}s, {millis}ms")
    } else {
        format!("{millis}ms")
    }
}
