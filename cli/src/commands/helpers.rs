use anyhow::{Result, bail};
use chrono::{Datelike, Local};

pub(crate) const DAY_NAMES: &[&str] = &[
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

pub(crate) fn day_name(day: u8) -> &'static str {
    DAY_NAMES[usize::from(day)]
}

/// Parse a day argument: an index 0-6 (Monday first), an English day name
/// or its three-letter form, or `today`.
pub(crate) fn parse_day(s: &str) -> Result<u8> {
    let lower = s.trim().to_lowercase();
    if let Ok(n) = lower.parse::<u8>() {
        if n <= 6 {
            return Ok(n);
        }
        bail!("Day index must be between 0 (Monday) and 6 (Sunday), got {n}");
    }
    match lower.as_str() {
        "monday" | "mon" => Ok(0),
        "tuesday" | "tue" => Ok(1),
        "wednesday" | "wed" => Ok(2),
        "thursday" | "thu" => Ok(3),
        "friday" | "fri" => Ok(4),
        "saturday" | "sat" => Ok(5),
        "sunday" | "sun" => Ok(6),
        "today" => Ok(Local::now().date_naive().weekday().num_days_from_monday() as u8),
        _ => bail!("Invalid day '{s}'. Use 0-6, monday-sunday, mon-sun, or today"),
    }
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}
