//! Environment overrides for the reminder configuration
//!
//! The primary configuration source is config.toml (see config_file module).
//! These variables sit between the file and the command line in precedence:
//! CLI flags > environment > config file.
//!
//! Environment variables (all optional):
//! - HYDRATION_INTERVAL_MINUTES: reminder interval in minutes
//! - HYDRATION_JITTER_SECONDS: random extra delay ceiling in seconds (0 disables)
//! - HYDRATION_AUTO_HIDE_SECONDS: how long the overlay stays up

use crate::config_file::ReminderConfig;
use crate::constants::{
    AUTO_HIDE_MAX_SECONDS, AUTO_HIDE_MIN_SECONDS, INTERVAL_MAX_MINUTES, INTERVAL_MIN_MINUTES,
    JITTER_MAX_SECONDS,
};
use log::{debug, info, warn};
use std::env;
use std::ops::RangeInclusive;

pub const ENV_INTERVAL_MINUTES: &str = "HYDRATION_INTERVAL_MINUTES";
pub const ENV_JITTER_SECONDS: &str = "HYDRATION_JITTER_SECONDS";
pub const ENV_AUTO_HIDE_SECONDS: &str = "HYDRATION_AUTO_HIDE_SECONDS";

/// Read `name` as an integer within `range`. Unset, unparseable and
/// out-of-range values all yield None; the latter two are logged.
fn parse_ranged(name: &str, range: RangeInclusive<u64>) -> Option<u64> {
    match env::var(name) {
        Ok(val) => match val.trim().parse::<u64>() {
            Ok(value) if range.contains(&value) => {
                info!("{} set via environment variable: {}", name, value);
                Some(value)
            }
            Ok(value) => {
                warn!(
                    "Invalid {}: {} (must be {}-{}). Ignoring.",
                    name,
                    value,
                    range.start(),
                    range.end()
                );
                None
            }
            Err(e) => {
                warn!("Failed to parse {}: {}. Ignoring.", name, e);
                None
            }
        },
        Err(_) => {
            debug!("{} not set.", name);
            None
        }
    }
}

/// Parse HYDRATION_INTERVAL_MINUTES (1-1440 minutes)
pub fn parse_interval_minutes() -> Option<u64> {
    parse_ranged(ENV_INTERVAL_MINUTES, INTERVAL_MIN_MINUTES..=INTERVAL_MAX_MINUTES)
}

/// Parse HYDRATION_JITTER_SECONDS (0-3600 seconds)
pub fn parse_jitter_seconds() -> Option<u64> {
    parse_ranged(ENV_JITTER_SECONDS, 0..=JITTER_MAX_SECONDS)
}

/// Parse HYDRATION_AUTO_HIDE_SECONDS (1-3600 seconds)
pub fn parse_auto_hide_seconds() -> Option<u64> {
    parse_ranged(ENV_AUTO_HIDE_SECONDS, AUTO_HIDE_MIN_SECONDS..=AUTO_HIDE_MAX_SECONDS)
}

/// Apply every valid environment override on top of `config`
pub fn apply_env_overrides(mut config: ReminderConfig) -> ReminderConfig {
    if let Some(minutes) = parse_interval_minutes() {
        config.reminder_interval_ms = minutes * 60 * 1000;
    }
    if let Some(seconds) = parse_jitter_seconds() {
        config.random_offset_ms = seconds * 1000;
    }
    if let Some(seconds) = parse_auto_hide_seconds() {
        config.auto_hide_ms = seconds * 1000;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test owns one variable so parallel tests do not race

    #[test]
    fn test_parse_interval_minutes() {
        env::set_var(ENV_INTERVAL_MINUTES, "30");
        assert_eq!(parse_interval_minutes(), Some(30), "Should accept 30 minutes");

        env::set_var(ENV_INTERVAL_MINUTES, " 90 ");
        assert_eq!(parse_interval_minutes(), Some(90), "Should trim whitespace");

        env::set_var(ENV_INTERVAL_MINUTES, "0");
        assert_eq!(parse_interval_minutes(), None, "Should reject 0 minutes");

        env::set_var(ENV_INTERVAL_MINUTES, "1441");
        assert_eq!(parse_interval_minutes(), None, "Should reject more than a day");

        env::set_var(ENV_INTERVAL_MINUTES, "soon");
        assert_eq!(parse_interval_minutes(), None, "Should reject non-numeric");

        env::remove_var(ENV_INTERVAL_MINUTES);
        assert_eq!(parse_interval_minutes(), None, "Should be None when unset");
    }

    #[test]
    fn test_parse_jitter_seconds() {
        env::set_var(ENV_JITTER_SECONDS, "0");
        assert_eq!(parse_jitter_seconds(), Some(0), "0 disables jitter");

        env::set_var(ENV_JITTER_SECONDS, "3600");
        assert_eq!(parse_jitter_seconds(), Some(3600));

        env::set_var(ENV_JITTER_SECONDS, "3601");
        assert_eq!(parse_jitter_seconds(), None);

        env::set_var(ENV_JITTER_SECONDS, "-5");
        assert_eq!(parse_jitter_seconds(), None, "Should reject negative");

        env::remove_var(ENV_JITTER_SECONDS);
    }

    #[test]
    fn test_parse_auto_hide_seconds() {
        env::set_var(ENV_AUTO_HIDE_SECONDS, "20");
        assert_eq!(parse_auto_hide_seconds(), Some(20));

        env::set_var(ENV_AUTO_HIDE_SECONDS, "0");
        assert_eq!(parse_auto_hide_seconds(), None, "Overlay needs at least a second");

        env::set_var(ENV_AUTO_HIDE_SECONDS, "");
        assert_eq!(parse_auto_hide_seconds(), None);

        env::remove_var(ENV_AUTO_HIDE_SECONDS);
    }
}
