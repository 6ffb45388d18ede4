//! The periodic tick source that drives an active countdown.

use crate::common::RunId;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::trace;

/// One scheduled update delivered to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickEvent {
    /// The run this tick was scheduled for.
    pub run: RunId,
    /// Ticks delivered so far for this run, starting at 1.
    pub tick_count: u64,
}

/// A fixed-cadence ticker bound to a single run.
///
/// The ticker runs as its own Tokio task and stops either when the callback
/// returns `false` or when its handle is aborted.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Ticker {
    period: Duration,
}

impl Ticker {
    pub(crate) fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
        }
    }

    /// Spawns the tick loop for `run`.
    ///
    /// The first tick fires one period after spawning. Ticks missed while
    /// the callback was busy are skipped rather than delivered in a burst.
    pub(crate) fn spawn<F, Fut>(self, run: RunId, mut on_tick: F) -> JoinHandle<()>
    where
        F: FnMut(TickEvent) -> Fut + Send + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        let period = self.period;
        tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut tick_count = 0;
            loop {
                interval.tick().await;
                tick_count += 1;
                let tick = TickEvent { run, tick_count };
                if !on_tick(tick).await {
                    trace!(%run, tick_count, "Ticker finished");
                    break;
                }
            }
        })
    }
}
