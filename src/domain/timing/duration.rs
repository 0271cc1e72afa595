//! Duration value object

use std::fmt;
use std::str::FromStr;
use std::time::Duration as StdDuration;

use crate::domain::error::DurationParseError;

/// Default sync loop cadence
pub const DEFAULT_TICK_MILLIS: u64 = 300;

/// Default per-request timeout for sync traffic
pub const DEFAULT_REQUEST_TIMEOUT_MILLIS: u64 = 3_000;

/// Default per-probe timeout during a subnet scan
pub const DEFAULT_PROBE_TIMEOUT_MILLIS: u64 = 2_000;

/// Default registry liveness window
pub const DEFAULT_DEVICE_TIMEOUT_SECS: u64 = 30;

/// Default interval between re-elections while hosting
pub const DEFAULT_RESCAN_INTERVAL_SECS: u64 = 60;

/// Millisecond-precision duration as written in config files and flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Duration {
    milliseconds: u64,
}

impl Duration {
    pub const fn from_millis(ms: u64) -> Self {
        Self { milliseconds: ms }
    }

    pub const fn from_secs(secs: u64) -> Self {
        Self::from_millis(secs * 1000)
    }

    pub const fn default_tick() -> Self {
        Self::from_millis(DEFAULT_TICK_MILLIS)
    }

    pub const fn default_request_timeout() -> Self {
        Self::from_millis(DEFAULT_REQUEST_TIMEOUT_MILLIS)
    }

    pub const fn default_probe_timeout() -> Self {
        Self::from_millis(DEFAULT_PROBE_TIMEOUT_MILLIS)
    }

    pub const fn default_device_timeout() -> Self {
        Self::from_secs(DEFAULT_DEVICE_TIMEOUT_SECS)
    }

    pub const fn default_rescan_interval() -> Self {
        Self::from_secs(DEFAULT_RESCAN_INTERVAL_SECS)
    }

    /// Whole seconds, truncated
    pub const fn as_secs(&self) -> u64 {
        self.milliseconds / 1000
    }

    pub const fn as_millis(&self) -> u64 {
        self.milliseconds
    }

    pub const fn as_std(&self) -> StdDuration {
        StdDuration::from_millis(self.milliseconds)
    }
}

/// Units in the order they may appear, largest first
const UNITS: [(&str, u64); 3] = [("m", 60_000), ("s", 1_000), ("ms", 1)];

/// Match the unit at the start of `rest`. `ms` is tried before `m`.
fn leading_unit(rest: &str) -> Option<(usize, &'static str, u64)> {
    [2usize, 0, 1].into_iter().find_map(|i| {
        let (name, scale) = UNITS[i];
        rest.starts_with(name).then_some((i, name, scale))
    })
}

impl FromStr for Duration {
    type Err = DurationParseError;

    /// Accepts `<n><unit>` segments with units `m`, `s`, `ms` in that order,
    /// e.g. `300ms`, `90s`, `2m30s`. Zero is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || DurationParseError {
            input: s.to_string(),
        };

        let input = s.trim().to_ascii_lowercase();
        let mut rest = input.as_str();
        let mut next_rank = 0;
        let mut total: u64 = 0;

        if rest.is_empty() {
            return Err(err());
        }

        while !rest.is_empty() {
            let digits = rest
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(rest.len());
            if digits == 0 {
                return Err(err());
            }
            let value: u64 = rest[..digits].parse().map_err(|_| err())?;
            rest = &rest[digits..];

            let (rank, name, scale) = leading_unit(rest).ok_or_else(err)?;
            if rank < next_rank {
                return Err(err());
            }
            next_rank = rank + 1;
            rest = &rest[name.len()..];

            total = value
                .checked_mul(scale)
                .and_then(|ms| total.checked_add(ms))
                .ok_or_else(err)?;
        }

        if total == 0 {
            return Err(err());
        }
        Ok(Self::from_millis(total))
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.milliseconds % 1000 != 0 {
            return write!(f, "{}ms", self.milliseconds);
        }

        let total_secs = self.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;

        if minutes == 0 {
            write!(f, "{}s", seconds)
        } else if seconds == 0 {
            write!(f, "{}m", minutes)
        } else {
            write!(f, "{}m{}s", minutes, seconds)
        }
    }
}

impl From<Duration> for StdDuration {
    fn from(d: Duration) -> Self {
        d.as_std()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_millis() {
        let d: Duration = "300ms".parse().unwrap();
        assert_eq!(d.as_millis(), 300);
    }

    #[test]
    fn parse_seconds_only() {
        let d: Duration = "30s".parse().unwrap();
        assert_eq!(d.as_secs(), 30);
        assert_eq!(d.as_millis(), 30000);
    }

    #[test]
    fn parse_minutes_only() {
        let d: Duration = "2m".parse().unwrap();
        assert_eq!(d.as_secs(), 120);
    }

    #[test]
    fn parse_minutes_and_seconds() {
        let d: Duration = "2m30s".parse().unwrap();
        assert_eq!(d.as_secs(), 150);
    }

    #[test]
    fn parse_case_insensitive() {
        let d: Duration = "1M30S".parse().unwrap();
        assert_eq!(d.as_secs(), 90);
        let d: Duration = "250MS".parse().unwrap();
        assert_eq!(d.as_millis(), 250);
    }

    #[test]
    fn parse_with_whitespace() {
        let d: Duration = "  30s  ".parse().unwrap();
        assert_eq!(d.as_secs(), 30);
    }

    #[test]
    fn parse_invalid_empty() {
        assert!("".parse::<Duration>().is_err());
    }

    #[test]
    fn parse_invalid_zero() {
        assert!("0s".parse::<Duration>().is_err());
        assert!("0ms".parse::<Duration>().is_err());
        assert!("0m0s".parse::<Duration>().is_err());
    }

    #[test]
    fn parse_invalid_format() {
        assert!("30".parse::<Duration>().is_err());
        assert!("abc".parse::<Duration>().is_err());
        assert!("30x".parse::<Duration>().is_err());
        assert!("1.5s".parse::<Duration>().is_err());
        assert!("msms".parse::<Duration>().is_err());
    }

    #[test]
    fn parse_mixed_units() {
        let d: Duration = "1m500ms".parse().unwrap();
        assert_eq!(d.as_millis(), 60_500);
    }

    #[test]
    fn parse_rejects_out_of_order_units() {
        assert!("30s1m".parse::<Duration>().is_err());
        assert!("1s1s".parse::<Duration>().is_err());
        assert!("1ms1s".parse::<Duration>().is_err());
    }

    #[test]
    fn display_round_values() {
        assert_eq!(Duration::from_secs(30).to_string(), "30s");
        assert_eq!(Duration::from_secs(120).to_string(), "2m");
        assert_eq!(Duration::from_secs(150).to_string(), "2m30s");
    }

    #[test]
    fn display_millis() {
        assert_eq!(Duration::from_millis(300).to_string(), "300ms");
        assert_eq!(Duration::from_millis(1500).to_string(), "1500ms");
    }

    #[test]
    fn display_parses_back() {
        for d in [
            Duration::from_millis(300),
            Duration::from_secs(2),
            Duration::from_secs(150),
        ] {
            assert_eq!(d.to_string().parse::<Duration>().unwrap(), d);
        }
    }

    #[test]
    fn as_std_duration() {
        let d = Duration::from_millis(300);
        assert_eq!(d.as_std(), StdDuration::from_millis(300));
    }

    #[test]
    fn default_values() {
        assert_eq!(Duration::default_tick().as_millis(), 300);
        assert_eq!(Duration::default_request_timeout().as_secs(), 3);
        assert_eq!(Duration::default_probe_timeout().as_secs(), 2);
        assert_eq!(Duration::default_device_timeout().as_secs(), 30);
        assert_eq!(Duration::default_rescan_interval().as_secs(), 60);
    }
}
