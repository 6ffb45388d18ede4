//! The countdown state machine.
//!
//! `CountdownTimer` is synchronous and takes the current instant as a
//! parameter, so every transition can be exercised without a runtime. The
//! engine wraps it in a lock and feeds it ticks from its ticker task.

use crate::common::RunId;
use crate::components::interpolation::Interpolation;
use crate::events::{CountdownEvent, Snapshot, Status};
use crate::time_spec::TimeSpec;
use chrono::Utc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace};

/// Owns the status, durations and the single active interpolation.
///
/// Intents that make no sense for the current status return `None` and
/// leave the state untouched.
#[derive(Debug, Clone, Default)]
pub struct CountdownTimer {
    status: Status,
    time: TimeSpec,
    duration_millis: u64,
    remaining_millis: u64,
    interpolation: Option<Interpolation>,
    run: RunId,
}

impl CountdownTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn time(&self) -> TimeSpec {
        self.time
    }

    pub fn duration_millis(&self) -> u64 {
        self.duration_millis
    }

    pub fn remaining_millis(&self) -> u64 {
        self.remaining_millis
    }

    /// The current run. Ticks carrying any other id are ignored.
    pub fn run(&self) -> RunId {
        self.run
    }

    /// Returns `true` while ticks for `run` should keep arriving.
    pub fn is_ticking(&self, run: RunId) -> bool {
        self.status == Status::Running && self.run == run && self.interpolation.is_some()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            status: self.status,
            elapsed_time: self.duration_millis,
            remaining_millis: self.remaining_millis,
        }
    }

    /// Updates the picked duration. Only honoured while idle.
    pub fn set_duration(&mut self, time: TimeSpec) -> Option<CountdownEvent> {
        if self.status != Status::Idle {
            debug!(status = %self.status, "Ignoring duration change outside idle");
            return None;
        }
        self.time = time;
        self.duration_millis = time.value();
        debug!(duration_millis = self.duration_millis, "Duration changed");
        Some(CountdownEvent::DurationChanged {
            duration_millis: self.duration_millis,
        })
    }

    /// Starts a run of the currently picked duration.
    pub fn start_picked(&mut self, now: Instant) -> Option<CountdownEvent> {
        self.start(self.time.value(), now)
    }

    /// Starts a fresh run of `duration_millis`.
    ///
    /// Any active interpolation is dropped first. A zero duration settles at
    /// idle straight away and schedules nothing.
    pub fn start(&mut self, duration_millis: u64, now: Instant) -> Option<CountdownEvent> {
        if self.interpolation.take().is_some() {
            debug!(run = %self.run, "Stopping active interpolation before restart");
        }
        self.status = Status::Idle;
        self.run = self.run.next();
        self.duration_millis = duration_millis;
        self.remaining_millis = duration_millis;

        if duration_millis == 0 {
            debug!(run = %self.run, "Zero-length run settles immediately");
            return Some(self.complete());
        }

        self.interpolation = Some(Interpolation::new(
            duration_millis,
            Duration::from_millis(duration_millis),
            now,
        ));
        self.status = Status::Running;
        debug!(run = %self.run, duration_millis, "Countdown started");
        Some(CountdownEvent::Started {
            run: self.run,
            duration_millis,
            at: Utc::now(),
        })
    }

    /// Halts the interpolation and freezes the remaining time.
    pub fn pause(&mut self, now: Instant) -> Option<CountdownEvent> {
        if self.status != Status::Running {
            debug!(status = %self.status, "Ignoring pause outside running");
            return None;
        }
        let interpolation = self.interpolation.take()?;
        let value = interpolation.halt(now).min(self.remaining_millis);
        if value == 0 {
            return Some(self.complete());
        }

        let run = self.run;
        self.run = self.run.next();
        self.remaining_millis = value;
        self.status = Status::Pausing;
        debug!(%run, remaining_millis = value, "Countdown paused");
        Some(CountdownEvent::Paused {
            run,
            remaining_millis: value,
        })
    }

    /// Continues a paused run.
    ///
    /// The new interpolation descends from the frozen remaining time at the
    /// same one-per-millisecond rate. Its nominal span is the full run
    /// duration, so it reaches zero before the span is over.
    pub fn resume(&mut self, now: Instant) -> Option<CountdownEvent> {
        if self.status != Status::Pausing {
            debug!(status = %self.status, "Ignoring resume outside pausing");
            return None;
        }
        self.run = self.run.next();
        self.interpolation = Some(Interpolation::new(
            self.remaining_millis,
            Duration::from_millis(self.duration_millis),
            now,
        ));
        self.status = Status::Running;
        debug!(run = %self.run, remaining_millis = self.remaining_millis, "Countdown resumed");
        Some(CountdownEvent::Resumed {
            run: self.run,
            remaining_millis: self.remaining_millis,
        })
    }

    /// Snaps the countdown to zero and returns to idle.
    pub fn cancel(&mut self) -> Option<CountdownEvent> {
        if self.status == Status::Idle {
            debug!("Ignoring cancel while idle");
            return None;
        }
        let from = self.status;
        let run = self.run;
        self.status = Status::Stop;
        self.interpolation = None;
        self.run = self.run.next();
        self.remaining_millis = 0;
        self.status = Status::Idle;
        debug!(%run, %from, "Countdown cancelled");
        Some(CountdownEvent::Cancelled { run, from })
    }

    /// Primary control: start when idle, pause when running, resume when paused.
    pub fn toggle(&mut self, now: Instant) -> Option<CountdownEvent> {
        match self.status {
            Status::Running => self.pause(now),
            Status::Pausing => self.resume(now),
            Status::Idle | Status::Stop => self.start_picked(now),
        }
    }

    /// Applies one interpolation sample for `run`.
    ///
    /// Stale ticks (from a run that was paused, cancelled, restarted or has
    /// completed) return `None` without touching state.
    pub fn tick(&mut self, run: RunId, now: Instant) -> Option<CountdownEvent> {
        if !self.is_ticking(run) {
            trace!(%run, current = %self.run, "Discarding stale tick");
            return None;
        }
        let interpolation = self.interpolation.as_ref()?;
        let value = interpolation.value_at(now).min(self.remaining_millis);
        if value == 0 || interpolation.is_finished(now) {
            return Some(self.complete());
        }
        self.remaining_millis = value;
        trace!(%run, remaining_millis = value, "Tick");
        Some(CountdownEvent::Tick {
            run,
            remaining_millis: value,
        })
    }

    fn complete(&mut self) -> CountdownEvent {
        let run = self.run;
        self.interpolation = None;
        self.run = self.run.next();
        self.remaining_millis = 0;
        self.status = Status::Idle;
        debug!(%run, duration_millis = self.duration_millis, "Countdown completed");
        CountdownEvent::Completed {
            run,
            duration_millis: self.duration_millis,
            at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn assert_consistent(timer: &CountdownTimer) {
        assert!(timer.remaining_millis() <= timer.duration_millis());
        assert_eq!(
            timer.remaining_millis() == 0,
            timer.status() == Status::Idle,
            "remaining == 0 must coincide with idle: {:?}",
            timer.snapshot()
        );
    }

    #[test]
    fn starts_idle_with_nothing_remaining() {
        let timer = CountdownTimer::new();
        assert_eq!(timer.snapshot(), Snapshot::default());
        assert_consistent(&timer);
    }

    #[test]
    fn set_duration_updates_elapsed_time_while_idle() {
        let mut timer = CountdownTimer::new();
        let event = timer.set_duration(TimeSpec::new(0, 0, 10));
        assert_eq!(
            event,
            Some(CountdownEvent::DurationChanged {
                duration_millis: 10_000
            })
        );
        assert_eq!(timer.duration_millis(), 10_000);
        assert_eq!(timer.remaining_millis(), 0);
    }

    #[test]
    fn set_duration_is_ignored_while_running() {
        let t0 = Instant::now();
        let mut timer = CountdownTimer::new();
        timer.start(5_000, t0);
        assert!(timer.set_duration(TimeSpec::new(1, 0, 0)).is_none());
        assert_eq!(timer.duration_millis(), 5_000);
    }

    #[test]
    fn start_then_cancel_returns_to_idle() {
        let t0 = Instant::now();
        for duration in [1, 5_000, 86_400_000] {
            let mut timer = CountdownTimer::new();
            timer.start(duration, t0);
            assert_eq!(timer.status(), Status::Running);
            assert_consistent(&timer);

            let event = timer.cancel();
            assert!(matches!(
                event,
                Some(CountdownEvent::Cancelled {
                    from: Status::Running,
                    ..
                })
            ));
            assert_eq!(timer.status(), Status::Idle);
            assert_eq!(timer.remaining_millis(), 0);
            assert_consistent(&timer);
        }
    }

    #[test]
    fn ticks_descend_and_complete_at_zero() {
        let t0 = Instant::now();
        let mut timer = CountdownTimer::new();
        timer.set_duration(TimeSpec::new(0, 0, 10));
        timer.start_picked(t0);
        let run = timer.run();

        let mut last = timer.remaining_millis();
        for step in 1..10 {
            let event = timer.tick(run, t0 + ms(step * 1_000));
            assert!(matches!(event, Some(CountdownEvent::Tick { .. })));
            assert!(timer.remaining_millis() <= last);
            last = timer.remaining_millis();
            assert_consistent(&timer);
        }
        assert_eq!(timer.remaining_millis(), 1_000);

        let event = timer.tick(run, t0 + ms(10_000));
        assert!(matches!(
            event,
            Some(CountdownEvent::Completed {
                duration_millis: 10_000,
                ..
            })
        ));
        assert_eq!(timer.snapshot().status, Status::Idle);
        assert_eq!(timer.remaining_millis(), 0);
        assert_eq!(timer.duration_millis(), 10_000);

        assert!(timer.tick(run, t0 + ms(11_000)).is_none());
        assert_eq!(timer.remaining_millis(), 0);
    }

    #[test]
    fn pause_freezes_and_resume_continues() {
        let t0 = Instant::now();
        let mut timer = CountdownTimer::new();
        timer.set_duration(TimeSpec::new(0, 1, 0));
        timer.start_picked(t0);
        let first_run = timer.run();

        timer.pause(t0 + ms(30_000));
        assert_eq!(timer.status(), Status::Pausing);
        assert_eq!(timer.remaining_millis(), 30_000);
        assert!(timer.tick(first_run, t0 + ms(40_000)).is_none());
        assert_eq!(timer.remaining_millis(), 30_000);

        let resumed_at = t0 + ms(45_000);
        timer.resume(resumed_at);
        assert_eq!(timer.remaining_millis(), 30_000);
        let run = timer.run();
        assert_ne!(run, first_run);

        timer.tick(run, resumed_at + ms(10_000));
        assert_eq!(timer.remaining_millis(), 20_000);
        timer.tick(run, resumed_at + ms(30_000));
        assert_eq!(timer.status(), Status::Idle);
        assert_consistent(&timer);
    }

    #[test]
    fn pause_then_immediate_resume_keeps_remaining() {
        let t0 = Instant::now();
        let mut timer = CountdownTimer::new();
        timer.start(8_000, t0);
        let at = t0 + ms(1_234);
        timer.pause(at);
        let frozen = timer.remaining_millis();
        timer.resume(at);
        assert_eq!(timer.remaining_millis(), frozen);
        assert_eq!(frozen, 6_766);
    }

    #[test]
    fn pause_at_zero_completes() {
        let t0 = Instant::now();
        let mut timer = CountdownTimer::new();
        timer.start(1_000, t0);
        let event = timer.pause(t0 + ms(1_500));
        assert!(matches!(event, Some(CountdownEvent::Completed { .. })));
        assert_eq!(timer.status(), Status::Idle);
        assert_consistent(&timer);
    }

    #[test]
    fn restart_discards_previous_run() {
        let t0 = Instant::now();
        let mut timer = CountdownTimer::new();
        timer.start(10_000, t0);
        let old_run = timer.run();
        timer.start(3_000, t0 + ms(500));
        assert_eq!(timer.duration_millis(), 3_000);

        assert!(timer.tick(old_run, t0 + ms(600)).is_none());
        assert_eq!(timer.remaining_millis(), 3_000);
        timer.tick(timer.run(), t0 + ms(1_500));
        assert_eq!(timer.remaining_millis(), 2_000);
    }

    #[test]
    fn zero_duration_never_runs() {
        let t0 = Instant::now();
        let mut timer = CountdownTimer::new();
        let event = timer.start(0, t0);
        assert!(matches!(event, Some(CountdownEvent::Completed { .. })));
        assert_eq!(timer.status(), Status::Idle);
        assert!(!timer.is_ticking(timer.run()));
        assert_consistent(&timer);
    }

    #[test]
    fn misuse_is_a_no_op() {
        let t0 = Instant::now();
        let mut timer = CountdownTimer::new();
        assert!(timer.pause(t0).is_none());
        assert!(timer.resume(t0).is_none());
        assert!(timer.cancel().is_none());

        timer.start(2_000, t0);
        assert!(timer.resume(t0).is_none());
        timer.pause(t0 + ms(100));
        assert!(timer.pause(t0 + ms(200)).is_none());
        assert_eq!(timer.remaining_millis(), 1_900);
    }

    #[test]
    fn cancel_from_pausing() {
        let t0 = Instant::now();
        let mut timer = CountdownTimer::new();
        timer.start(2_000, t0);
        timer.pause(t0 + ms(100));
        let event = timer.cancel();
        assert!(matches!(
            event,
            Some(CountdownEvent::Cancelled {
                from: Status::Pausing,
                ..
            })
        ));
        assert!(timer.resume(t0 + ms(200)).is_none());
        assert_consistent(&timer);
    }

    #[test]
    fn toggle_cycles_through_primary_actions() {
        let t0 = Instant::now();
        let mut timer = CountdownTimer::new();
        timer.set_duration(TimeSpec::new(0, 0, 5));

        timer.toggle(t0);
        assert_eq!(timer.status(), Status::Running);
        timer.toggle(t0 + ms(1_000));
        assert_eq!(timer.status(), Status::Pausing);
        assert_eq!(timer.remaining_millis(), 4_000);
        timer.toggle(t0 + ms(2_000));
        assert_eq!(timer.status(), Status::Running);
        assert_eq!(timer.remaining_millis(), 4_000);
    }
}
