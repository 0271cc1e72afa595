//! Server epoch value object

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::domain::error::EpochParseError;

/// Last epoch handed out by this process, in microseconds.
static LAST_EPOCH_MICROS: AtomicU64 = AtomicU64::new(0);

/// Wall-clock instant at which a relay server started, in seconds since the
/// UNIX epoch.
///
/// The smaller epoch wins an election. Values handed out by [`ServerEpoch::now`]
/// are strictly increasing within one process, so two servers started by the
/// same process never tie.
#[derive(Debug, Clone, Copy)]
pub struct ServerEpoch(f64);

impl ServerEpoch {
    /// Epoch for a server starting right now
    pub fn now() -> Self {
        let wall = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_micros() as u64)
            .unwrap_or(0);

        let mut last = LAST_EPOCH_MICROS.load(AtomicOrdering::SeqCst);
        loop {
            let next = wall.max(last + 1);
            match LAST_EPOCH_MICROS.compare_exchange(
                last,
                next,
                AtomicOrdering::SeqCst,
                AtomicOrdering::SeqCst,
            ) {
                Ok(_) => return Self::from_micros(next),
                Err(actual) => last = actual,
            }
        }
    }

    pub fn from_secs_f64(secs: f64) -> Self {
        Self(secs)
    }

    pub fn from_micros(micros: u64) -> Self {
        Self(micros as f64 / 1_000_000.0)
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.0
    }

    /// True when this epoch has seniority over `other`
    pub fn is_older_than(&self, other: &ServerEpoch) -> bool {
        self < other
    }
}

impl PartialEq for ServerEpoch {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for ServerEpoch {}

impl PartialOrd for ServerEpoch {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ServerEpoch {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for ServerEpoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}

impl FromStr for ServerEpoch {
    type Err = EpochParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let secs: f64 = s.trim().parse().map_err(|_| EpochParseError {
            input: s.to_string(),
        })?;

        if !secs.is_finite() || secs < 0.0 {
            return Err(EpochParseError {
                input: s.to_string(),
            });
        }

        Ok(Self(secs))
    }
}
