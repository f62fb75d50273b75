use std::time::Duration;

/// Format milliseconds as MM:SS timestamp
pub fn format_timestamp_ms(millis: u64) -> String {
    let total_secs = millis / 1000;
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

/// Format an optional block time range as `[MM:SS–MM:SS]`
pub fn format_time_range(start_ms: Option<u64>, end_ms: Option<u64>) -> Option<String> {
    match (start_ms, end_ms) {
        (Some(start), Some(end)) => Some(format!(
            "[{}–{}]",
            format_timestamp_ms(start),
            format_timestamp_ms(end)
        )),
        _ => None,
    }
}

pub fn format_duration(d: Duration) -> String {
    let total = d.as_secs();
    if total < 60 {
        let tenths = d.subsec_millis() / 100;
        format!("{total}.{tenths}s")
    } else {
        format!("{}m {}s", total / 60, total % 60)
    }
}

/// Human-readable file size, e.g. `12.3 MB`
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut size = bytes as f64 / 1024.0;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", size, UNITS[unit])
}
