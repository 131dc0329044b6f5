pub mod duration;

pub use duration::{format_interval, format_short_duration};

/// Fill the `{interval}` placeholder of the reminder message
pub fn render_message(template: &str, interval_ms: u64) -> String {
    template.replace("{interval}", &format_interval(interval_ms))
}

/// Fill the `{remaining}` placeholder of the countdown line
pub fn render_countdown(template: &str, remaining_text: &str) -> String {
    template.replace("{remaining}", remaining_text)
}
