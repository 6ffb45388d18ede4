//! The engine that owns the countdown and drives it in wall-clock time.

use crate::common::{ListenerId, RunId};
use crate::components::timer::CountdownTimer;
use crate::config::CountdownConfig;
use crate::controls::Controls;
use crate::events::{CountdownEvent, Snapshot, Status, SystemEvent};
use crate::time::{TickEvent, Ticker};
use crate::time_spec::{TimeField, TimeSpec};
use slotmap::SlotMap;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, trace};

/// A callback invoked with the new state after every mutation.
pub type StateListener = Box<dyn FnMut(&Snapshot) + Send + Sync>;

struct ActiveTicker {
    run: RunId,
    handle: JoinHandle<()>,
}

/// The countdown engine.
///
/// This struct is the single point of control for one countdown session. It
/// holds the timer state, the subscribed listeners and the ticker task that
/// samples the interpolation while a run is active. The engine is cheap to
/// clone; every clone is a handle to the same session.
///
/// Every intent takes effect before it returns. The state change, the
/// ticker swap and the notification of listeners all happen under the state
/// lock, so a tick that was already in flight can never be observed after a
/// pause or cancel that overtook it.
#[derive(Clone)]
pub struct CountdownEngine {
    config: Arc<CountdownConfig>,
    timer: Arc<RwLock<CountdownTimer>>,
    listeners: Arc<RwLock<SlotMap<ListenerId, StateListener>>>,
    ticker: Arc<Mutex<Option<ActiveTicker>>>,
    event_sender: broadcast::Sender<CountdownEvent>,
    system_event_sender: broadcast::Sender<SystemEvent>,
}

// Core implementation block for internal logic.
impl CountdownEngine {
    /// Creates a new, idle `CountdownEngine` with the given configuration.
    pub fn new(config: CountdownConfig) -> Self {
        let capacity = config.event_capacity.max(1);
        let (event_sender, _) = broadcast::channel(capacity);
        let (system_event_sender, _) = broadcast::channel(64);

        info!(resolution = ?config.resolution, "CountdownEngine created");
        Self {
            config: Arc::new(config),
            timer: Arc::new(RwLock::new(CountdownTimer::new())),
            listeners: Arc::new(RwLock::new(SlotMap::with_key())),
            ticker: Arc::new(Mutex::new(None)),
            event_sender,
            system_event_sender,
        }
    }

    pub fn config(&self) -> &CountdownConfig {
        &self.config
    }

    /// Runs `transition` against the timer and publishes the outcome.
    #[doc(hidden)]
    async fn apply<F>(&self, intent: &'static str, transition: F) -> Option<CountdownEvent>
    where
        F: FnOnce(&mut CountdownTimer, Instant) -> Option<CountdownEvent>,
    {
        let mut timer = self.timer.write().await;
        let event = transition(&mut *timer, Instant::now());
        match &event {
            Some(event) => {
                self.reschedule(&*timer).await;
                self.publish(event.clone(), timer.snapshot()).await;
            }
            None => debug!(intent, status = %timer.status(), "Intent ignored"),
        }
        event
    }

    /// Makes the ticker match the timer: one task for the current run while
    /// it is running, none otherwise.
    #[doc(hidden)]
    async fn reschedule(&self, timer: &CountdownTimer) {
        let mut slot = self.ticker.lock().await;
        let run = timer.run();
        let ticking = timer.is_ticking(run);

        if let Some(active) = slot.take() {
            if ticking && active.run == run {
                *slot = Some(active);
                return;
            }
            active.handle.abort();
            trace!(run = %active.run, "Ticker stopped");
        }

        if ticking {
            let engine = self.clone();
            let ticker = Ticker::new(self.config.resolution.period());
            let handle = ticker.spawn(run, move |tick| {
                let engine = engine.clone();
                async move { engine.process_tick(tick).await }
            });
            *slot = Some(ActiveTicker { run, handle });
            trace!(%run, "Ticker started");
        }
    }

    /// Applies a tick. Returns `false` once the run no longer wants ticks.
    #[doc(hidden)]
    async fn process_tick(&self, tick: TickEvent) -> bool {
        let mut timer = self.timer.write().await;
        let event = timer.tick(tick.run, Instant::now());
        let keep_ticking = timer.is_ticking(tick.run);
        if let Some(event) = event {
            if matches!(event, CountdownEvent::Completed { .. }) {
                info!(run = %tick.run, ticks = tick.tick_count, "Countdown finished");
            }
            self.publish(event, timer.snapshot()).await;
        }
        keep_ticking
    }

    /// Broadcasts `event` and hands `snapshot` to every listener, in order.
    #[doc(hidden)]
    async fn publish(&self, event: CountdownEvent, snapshot: Snapshot) {
        self.event_sender.send(event).ok();
        let mut listeners = self.listeners.write().await;
        for (_id, listener) in listeners.iter_mut() {
            listener(&snapshot);
        }
    }
}

// Public API implementation block.
impl CountdownEngine {
    /// Sets the picked duration. Ignored unless the countdown is idle.
    pub async fn set_duration(&self, hour: u32, minute: u32, second: u32) -> Option<CountdownEvent> {
        let clamp = self.config.clamp_picker;
        self.apply("set_duration", move |timer, _| {
            let time = TimeSpec::new(hour, minute, second);
            timer.set_duration(if clamp { time.clamped() } else { time })
        })
        .await
    }

    /// Sets a single picker field, keeping the other two.
    pub async fn set_field(&self, field: TimeField, value: u32) -> Option<CountdownEvent> {
        let value = if self.config.clamp_picker {
            field.clamp(value)
        } else {
            value
        };
        self.apply("set_field", move |timer, _| {
            let mut time = timer.time();
            time.set(field, value);
            timer.set_duration(time)
        })
        .await
    }

    /// Starts a run of the picked duration.
    pub async fn start(&self) -> Option<CountdownEvent> {
        self.apply("start", |timer, now| timer.start_picked(now))
            .await
    }

    /// Starts a run of an explicit duration, restarting any active run.
    pub async fn start_with(&self, duration_millis: u64) -> Option<CountdownEvent> {
        self.apply("start", move |timer, now| timer.start(duration_millis, now))
            .await
    }

    /// Halts the active run and freezes the remaining time.
    pub async fn pause(&self) -> Option<CountdownEvent> {
        self.apply("pause", |timer, now| timer.pause(now)).await
    }

    /// Continues a paused run.
    pub async fn resume(&self) -> Option<CountdownEvent> {
        self.apply("resume", |timer, now| timer.resume(now)).await
    }

    /// Cancels the active or paused run. No tick is applied afterwards.
    pub async fn cancel(&self) -> Option<CountdownEvent> {
        self.apply("cancel", |timer, _| timer.cancel()).await
    }

    /// Performs whatever the primary control currently offers.
    pub async fn toggle(&self) -> Option<CountdownEvent> {
        self.apply("toggle", |timer, now| timer.toggle(now)).await
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.timer.read().await.snapshot()
    }

    pub async fn status(&self) -> Status {
        self.timer.read().await.status()
    }

    /// The configured total duration in milliseconds.
    pub async fn elapsed_time(&self) -> u64 {
        self.timer.read().await.duration_millis()
    }

    pub async fn remaining_millis(&self) -> u64 {
        self.timer.read().await.remaining_millis()
    }

    pub async fn time_spec(&self) -> TimeSpec {
        self.timer.read().await.time()
    }

    pub async fn controls(&self) -> Controls {
        Controls::for_snapshot(&self.snapshot().await)
    }

    /// Registers a listener that receives a snapshot after every mutation.
    ///
    /// Listeners run while the engine's state lock is held and must not
    /// block.
    ///
    /// # Returns
    /// A `ListenerId` which can be passed to `unsubscribe`.
    pub async fn subscribe(
        &self,
        listener: impl FnMut(&Snapshot) + Send + Sync + 'static,
    ) -> ListenerId {
        let id = self.listeners.write().await.insert(Box::new(listener));
        self.system_event_sender
            .send(SystemEvent::ListenerAdded { id })
            .ok();
        id
    }

    /// Removes a listener.
    ///
    /// Returns `true` if the listener was found and removed.
    pub async fn unsubscribe(&self, id: ListenerId) -> bool {
        let was_removed = self.listeners.write().await.remove(id).is_some();
        if was_removed {
            self.system_event_sender
                .send(SystemEvent::ListenerRemoved { id })
                .ok();
        }
        was_removed
    }

    /// Subscribes to the `CountdownEvent` stream.
    pub fn subscribe_events(&self) -> broadcast::Receiver<CountdownEvent> {
        self.event_sender.subscribe()
    }

    /// Subscribes to the `SystemEvent` stream.
    pub fn subscribe_system_events(&self) -> broadcast::Receiver<SystemEvent> {
        self.system_event_sender.subscribe()
    }

    /// Cancels any run, stops the ticker and announces the shutdown.
    pub async fn shutdown(&self) {
        info!("CountdownEngine shutting down...");
        self.cancel().await;
        if let Some(active) = self.ticker.lock().await.take() {
            active.handle.abort();
        }
        self.system_event_sender
            .send(SystemEvent::EngineShutdown)
            .ok();
        info!("CountdownEngine has shut down.");
    }
}

impl Default for CountdownEngine {
    fn default() -> Self {
        Self::new(CountdownConfig::default())
    }
}
