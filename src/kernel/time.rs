use chrono::{DateTime, Utc};

/// Trigger polling period.
pub const TICK_MS: u64 = 50;

/// FT8 slot length. Windows open on multiples of this.
pub const CYCLE_SECS: i64 = 15;

/// Wall-clock UTC second, as read by the trigger and stamped on spots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EpochSecond(pub i64);

impl EpochSecond {
    pub fn now() -> Self {
        EpochSecond(Utc::now().timestamp())
    }

    pub fn is_cycle_boundary(&self) -> bool {
        self.0.rem_euclid(CYCLE_SECS) == 0
    }

    fn as_datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.0, 0).unwrap_or_default()
    }

    /// `yyMMdd_hhmmss`, the WAV file stem.
    pub fn window_stamp(&self) -> String {
        self.as_datetime().format("%y%m%d_%H%M%S").to_string()
    }

    /// `yyMMdd`, prefixed to decode log lines.
    pub fn date_stamp(&self) -> String {
        self.as_datetime().format("%y%m%d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stamps_are_utc() {
        // 2018-07-01 12:34:45 UTC
        let t = EpochSecond(1_530_448_485);
        assert_eq!(t.window_stamp(), "180701_123445");
        assert_eq!(t.date_stamp(), "180701");
        assert!(t.is_cycle_boundary());
        assert!(!EpochSecond(1_530_448_486).is_cycle_boundary());
    }
}
