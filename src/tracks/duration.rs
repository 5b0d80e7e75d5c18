//! Clock-style durations as found in track fields

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static CLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(?:(?P<h>[0-9]{1,2}):)?(?P<m>[0-9]{1,2}):)?(?P<s>[0-9]{1,2})$").unwrap()
});

/// A non-negative length of time, in whole seconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Duration {
    total_seconds: u64,
}

impl Duration {
    pub fn from_seconds(total_seconds: u64) -> Self {
        Self { total_seconds }
    }

    pub fn from_hms(hours: u64, minutes: u64, seconds: u64) -> Self {
        Self::from_seconds(hours * 3600 + minutes * 60 + seconds)
    }

    /// Parse `HH:MM:SS`, `H:MM:SS`, `MM:SS` or the same digits without
    /// separators (`HHMMSS`, `HMMSS`, `MMSS`). The rightmost group is always
    /// seconds. Anything else is not a duration.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if !raw.contains(':') {
            return Self::parse_compact(raw);
        }

        let caps = CLOCK.captures(raw)?;
        let group = |name: &str| -> u64 {
            caps.name(name)
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(0)
        };
        Some(Self::from_hms(group("h"), group("m"), group("s")))
    }

    /// Up to six digits, split into two-digit groups from the right
    fn parse_compact(raw: &str) -> Option<Self> {
        if raw.is_empty() || raw.len() > 6 || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let (rest, seconds) = raw.split_at(raw.len().saturating_sub(2));
        let (hours, minutes) = rest.split_at(rest.len().saturating_sub(2));
        let number = |s: &str| -> u64 { s.parse().unwrap_or(0) };
        Some(Self::from_hms(number(hours), number(minutes), number(seconds)))
    }

    pub fn total_seconds(&self) -> u64 {
        self.total_seconds
    }

    pub fn hours(&self) -> u64 {
        self.total_seconds / 3600
    }

    pub fn minutes(&self) -> u64 {
        (self.total_seconds % 3600) / 60
    }

    pub fn seconds(&self) -> u64 {
        self.total_seconds % 60
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hours(), self.minutes(), self.seconds())
    }
}
