//! Absolute-minute clock helpers.
//!
//! The simulator counts minutes since midnight of day 1. Day numbers are
//! 1-based.

use crate::config::MINUTES_PER_DAY;

/// Calendar day (1-based) containing an absolute minute.
pub fn day_of(absolute_minute: u32) -> u32 {
    absolute_minute / MINUTES_PER_DAY + 1
}

/// Minute of day (0..1440) of an absolute minute.
pub fn minute_of_day(absolute_minute: u32) -> u32 {
    absolute_minute % MINUTES_PER_DAY
}

/// Absolute minute for a minute of day on a given day.
pub fn absolute_minute(day: u32, minute_of_day: u32) -> u32 {
    day.saturating_sub(1) * MINUTES_PER_DAY + minute_of_day
}

/// Format a minute of day as `HH:MM`.
pub fn format_hhmm(minute: u32) -> String {
    format!("{:02}:{:02}", minute / 60, minute % 60)
}

/// Format a minute of day as `HH:MM:SS` (seconds always zero).
pub fn format_hhmmss(minute: u32) -> String {
    format!("{}:00", format_hhmm(minute))
}
