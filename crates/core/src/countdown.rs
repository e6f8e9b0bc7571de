//! Offer countdown.
//!
//! The offer payload carries a duration in seconds; the extension counts it
//! down once per second and shows it as `m:ss`.

use std::fmt;

/// Seconds left before the offer expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Countdown {
    remaining: u32,
}

impl Countdown {
    /// Start a countdown at `seconds`.
    #[must_use]
    pub const fn new(seconds: u32) -> Self {
        Self { remaining: seconds }
    }

    /// Seconds left.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.remaining / 60, self.remaining % 60)
    }
}

/// Format a number of seconds as `m:ss`.
#[must_use]
pub fn format_countdown(seconds: u32) -> String {
    Countdown::new(seconds).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_countdown() {
        assert_eq!(format_countdown(300), "5:00");
        assert_eq!(format_countdown(61), "1:01");
        assert_eq!(format_countdown(9), "0:09");
        assert_eq!(format_countdown(0), "0:00");
        assert_eq!(format_countdown(3600), "60:00");
    }

    #[test]
    fn test_countdown_display() {
        let countdown = Countdown::new(125);
        assert_eq!(countdown.remaining(), 125);
        assert_eq!(countdown.to_string(), "2:05");
    }
}
