//! Cooldown formatting for status labels and chat messages.

use std::time::Duration;

/// Whole seconds left, rounding partial seconds up so "0" only means ready.
pub fn remaining_secs(remaining: Duration) -> u64 {
    let secs = remaining.as_secs();
    if remaining.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs
    }
}

/// Formats a remaining cooldown ("ready", "59s", "5m 30s", "1h 0m").
pub fn format_remaining(seconds: u64) -> String {
    if seconds == 0 {
        "ready".to_string()
    } else if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    }
}

/// Formats a configured cooldown for the kit card ("5 minutes", "1 hour").
pub fn format_cooldown_label(seconds: u64) -> String {
    let (value, unit) = if seconds < 60 {
        (seconds, "second")
    } else if seconds < 3600 {
        (seconds / 60, "minute")
    } else {
        (seconds / 3600, "hour")
    };
    if value == 1 {
        format!("{} {}", value, unit)
    } else {
        format!("{} {}s", value, unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_remaining_boundaries() {
        assert_eq!(format_remaining(0), "ready");
        assert_eq!(format_remaining(1), "1s");
        assert_eq!(format_remaining(59), "59s");
        assert_eq!(format_remaining(60), "1m 0s");
        assert_eq!(format_remaining(330), "5m 30s");
        assert_eq!(format_remaining(3599), "59m 59s");
        assert_eq!(format_remaining(3600), "1h 0m");
        assert_eq!(format_remaining(7260), "2h 1m");
    }

    #[test]
    fn test_format_cooldown_label() {
        assert_eq!(format_cooldown_label(1), "1 second");
        assert_eq!(format_cooldown_label(30), "30 seconds");
        assert_eq!(format_cooldown_label(60), "1 minute");
        assert_eq!(format_cooldown_label(300), "5 minutes");
        assert_eq!(format_cooldown_label(3600), "1 hour");
        assert_eq!(format_cooldown_label(7200), "2 hours");
    }

    #[test]
    fn test_remaining_secs_rounds_up() {
        assert_eq!(remaining_secs(Duration::ZERO), 0);
        assert_eq!(remaining_secs(Duration::from_millis(1)), 1);
        assert_eq!(remaining_secs(Duration::from_millis(59_500)), 60);
        assert_eq!(remaining_secs(Duration::from_secs(300)), 300);
    }
}
