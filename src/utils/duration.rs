/// Format a reminder interval as whole hours and minutes.
///
/// Zero components are omitted; anything under a minute reads as
/// "less than a minute".
pub fn format_interval(milliseconds: u64) -> String {
    let minutes_total = milliseconds / 60_000;
    let hours = minutes_total / 60;
    let minutes = minutes_total % 60;

    let mut parts = Vec::with_capacity(2);
    if hours > 0 {
        parts.push(format!("{} hour{}", hours, plural(hours)));
    }
    if minutes > 0 {
        parts.push(format!("{} minute{}", minutes, plural(minutes)));
    }

    if parts.is_empty() {
        return "less than a minute".to_string();
    }
    parts.join(" ")
}

/// Compact countdown text such as "1h 1m", "12m 5s" or "42s".
///
/// Hours appear only when nonzero, minutes always follow hours, seconds are
/// shown only when there are no hours. Zero renders as "now".
pub fn format_short_duration(milliseconds: u64) -> String {
    if milliseconds == 0 {
        return "now".to_string();
    }

    let seconds_total = milliseconds / 1000;
    let hours = seconds_total / 3600;
    let minutes = (seconds_total % 3600) / 60;
    let seconds = seconds_total % 60;

    let mut parts = Vec::with_capacity(3);
    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if minutes > 0 || hours > 0 {
        parts.push(format!("{}m", minutes));
    }
    if hours == 0 {
        parts.push(format!("{}s", seconds));
    }
    parts.join(" ")
}

fn plural(n: u64) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}
