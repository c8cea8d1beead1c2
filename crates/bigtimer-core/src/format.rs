/// `M:SS` clock face, e.g. `"9:05"`, `"120:00"`.
pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Default label for a step of `minutes`: `"45 min"`, `"1h"`, `"1h 30m"`.
pub fn format_step_name(minutes: u32) -> String {
    if minutes < 60 {
        return format!("{minutes} min");
    }
    let hrs = minutes / 60;
    let mins = minutes % 60;
    if mins > 0 {
        format!("{hrs}h {mins}m")
    } else {
        format!("{hrs}h")
    }
}
