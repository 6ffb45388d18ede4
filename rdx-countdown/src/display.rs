//! Values a renderer derives from a [`Snapshot`](crate::events::Snapshot).

use crate::events::Snapshot;
use std::fmt;

const MILLIS_PER_HOUR: u64 = 3_600_000;
const MILLIS_PER_MINUTE: u64 = 60_000;
const MILLIS_PER_SECOND: u64 = 1_000;

/// Sweep of the progress ring in degrees. Zero when no duration is set.
pub fn sweep_angle(remaining_millis: u64, duration_millis: u64) -> f32 {
    if duration_millis == 0 {
        return 0.0;
    }
    (360.0 * remaining_millis as f64 / duration_millis as f64) as f32
}

/// Remaining time split into display units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigitDisplay {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl DigitDisplay {
    pub fn from_millis(millis: u64) -> Self {
        Self {
            hours: millis / MILLIS_PER_HOUR,
            minutes: (millis / MILLIS_PER_MINUTE) % 60,
            seconds: (millis / MILLIS_PER_SECOND) % 60,
        }
    }
}

impl From<&Snapshot> for DigitDisplay {
    fn from(snapshot: &Snapshot) -> Self {
        Self::from_millis(snapshot.remaining_millis)
    }
}

/// `MM:SS`, or `HH:MM:SS` once there is at least one hour left.
impl fmt::Display for DigitDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hours > 0 {
            write!(f, "{:02}:", self.hours)?;
        }
        write!(f, "{:02}:{:02}", self.minutes, self.seconds)
    }
}
