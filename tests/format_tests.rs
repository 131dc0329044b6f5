use hydration_reminder::config_file::ReminderConfig;
use hydration_reminder::utils::{format_interval, format_short_duration, render_countdown, render_message};

#[test]
fn test_format_interval() {
    assert_eq!(format_interval(2_700_000), "45 minutes");
    assert_eq!(format_interval(60_000), "1 minute");
    assert_eq!(format_interval(3_600_000), "1 hour");
    assert_eq!(format_interval(5_400_000), "1 hour 30 minutes");
    assert_eq!(format_interval(7_260_000), "2 hours 1 minute");
    assert_eq!(format_interval(59_999), "less than a minute");
    assert_eq!(format_interval(0), "less than a minute");
}

#[test]
fn test_countdown_text() {
    assert_eq!(format_short_duration(3_661_000), "1h 1m");
    assert_eq!(format_short_duration(0), "now");
    assert_eq!(format_short_duration(7_200_000), "2h 0m");
    assert_eq!(format_short_duration(754_000), "12m 34s");
    assert_eq!(format_short_duration(42_000), "42s");
    assert_eq!(format_short_duration(999), "0s");
}

#[test]
fn test_default_message_mentions_interval() {
    let cfg = ReminderConfig::default();
    assert_eq!(
        cfg.message(),
        "It's time to take a sip of water.\nEvery 45 minutes"
    );
}

#[test]
fn test_templates_without_placeholders_pass_through() {
    assert_eq!(render_message("Drink!", 60_000), "Drink!");
    assert_eq!(render_countdown("Soon", "5m 0s"), "Soon");
    assert_eq!(render_countdown("{remaining} left", "now"), "now left");
}
