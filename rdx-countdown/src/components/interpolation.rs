//! A linear, time-driven value that descends to zero.

use std::time::Duration;
use tokio::time::Instant;

/// Descends from `from` towards zero at one unit per elapsed millisecond.
///
/// `span` is the nominal length of the interpolation. The value may reach
/// zero before the span is over (a resumed run starts below its span), and
/// the interpolation is finished as soon as either happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpolation {
    from: u64,
    span: Duration,
    started_at: Instant,
}

impl Interpolation {
    pub fn new(from: u64, span: Duration, started_at: Instant) -> Self {
        Self {
            from,
            span,
            started_at,
        }
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.started_at)
    }

    /// Samples the interpolated value, truncated to whole milliseconds.
    pub fn value_at(&self, now: Instant) -> u64 {
        let elapsed_ms = u64::try_from(self.elapsed(now).as_millis()).unwrap_or(u64::MAX);
        self.from.saturating_sub(elapsed_ms)
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        self.value_at(now) == 0 || self.elapsed(now) >= self.span
    }

    /// Stops the interpolation and returns the value it was frozen at.
    pub fn halt(self, now: Instant) -> u64 {
        if self.elapsed(now) >= self.span {
            0
        } else {
            self.value_at(now)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn descends_one_unit_per_millisecond() {
        let t0 = Instant::now();
        let it = Interpolation::new(10_000, ms(10_000), t0);
        assert_eq!(it.value_at(t0), 10_000);
        assert_eq!(it.value_at(t0 + ms(1)), 9_999);
        assert_eq!(it.value_at(t0 + ms(2_500)), 7_500);
        assert_eq!(it.value_at(t0 + ms(10_000)), 0);
        assert_eq!(it.value_at(t0 + ms(60_000)), 0);
    }

    #[test]
    fn sub_millisecond_progress_truncates() {
        let t0 = Instant::now();
        let it = Interpolation::new(100, ms(100), t0);
        assert_eq!(it.value_at(t0 + Duration::from_micros(1_900)), 99);
    }

    #[test]
    fn resumed_interpolation_finishes_before_nominal_span() {
        let t0 = Instant::now();
        let it = Interpolation::new(3_000, ms(10_000), t0);
        assert!(!it.is_finished(t0 + ms(2_999)));
        assert!(it.is_finished(t0 + ms(3_000)));
        assert_eq!(it.value_at(t0 + ms(3_000)), 0);
    }

    #[test]
    fn halt_freezes_current_value() {
        let t0 = Instant::now();
        let it = Interpolation::new(60_000, ms(60_000), t0);
        assert_eq!(it.halt(t0 + ms(30_000)), 30_000);
    }

    #[test]
    fn halt_after_span_is_zero() {
        let t0 = Instant::now();
        let it = Interpolation::new(500, ms(400), t0);
        assert_eq!(it.clone().halt(t0 + ms(399)), 101);
        assert_eq!(it.halt(t0 + ms(400)), 0);
    }
}
