//! Time-remaining notices.

/// A time-remaining notice raised on the rising edge of `show_time_notice`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoticeEvent {
    /// Whole minutes left, rounded down.  `0` when the budget is unknown.
    pub remaining_minutes: u64,
}

impl NoticeEvent {
    /// Human-readable body for the notice, e.g. `"Time remaining: 2 hours"`.
    pub fn message(&self) -> String {
        format!("Time remaining: {}", format_remaining(self.remaining_minutes))
    }
}

/// Formats a minute count the way the lock notices present it.
///
/// Below one minute the text is "less than 1 minute"; an hour or more is
/// shown in whole hours; everything else in minutes.
pub fn format_remaining(minutes: u64) -> String {
    let hours = minutes / 60;
    if hours > 0 {
        return match hours {
            1 => "1 hour".to_string(),
            n => format!("{n} hours"),
        };
    }
    match minutes {
        0 => "less than 1 minute".to_string(),
        1 => "1 minute".to_string(),
        n => format!("{n} minutes"),
    }
}
