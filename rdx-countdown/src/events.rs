//! Defines the observable state and every event broadcast by the engine.
//!
//! Renderers either register a synchronous listener that receives a
//! [`Snapshot`] after every mutation, or subscribe to the strongly-typed
//! [`CountdownEvent`] stream for a transition log.

use crate::common::{ListenerId, RunId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// The discrete state of the countdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// No run in progress. Remaining time is zero.
    #[default]
    Idle,
    /// The interpolation is active and ticks are being delivered.
    Running,
    /// The interpolation is halted with remaining time frozen.
    Pausing,
    /// A cancel is being processed. Never observable once an intent settles.
    Stop,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Status::Idle => "idle",
            Status::Running => "running",
            Status::Pausing => "pausing",
            Status::Stop => "stop",
        };
        f.pad(label)
    }
}

/// Everything a renderer needs, read at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub status: Status,
    /// The configured total duration of the run, in milliseconds.
    pub elapsed_time: u64,
    pub remaining_millis: u64,
}

/// Transitions of the countdown state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountdownEvent {
    /// The picker changed the configured duration while idle.
    DurationChanged { duration_millis: u64 },
    /// A new run began.
    Started {
        run: RunId,
        duration_millis: u64,
        at: DateTime<Utc>,
    },
    /// An interpolation sample was applied.
    Tick { run: RunId, remaining_millis: u64 },
    /// The run was halted with the given remaining time.
    Paused { run: RunId, remaining_millis: u64 },
    /// A paused run continued.
    Resumed { run: RunId, remaining_millis: u64 },
    /// The run was cancelled from the given status.
    Cancelled { run: RunId, from: Status },
    /// The remaining time reached zero.
    Completed {
        run: RunId,
        duration_millis: u64,
        at: DateTime<Utc>,
    },
}

/// Events related to the lifecycle of the engine itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemEvent {
    /// Fired once when `shutdown` is called.
    EngineShutdown,
    /// Fired when a new state listener is subscribed.
    ListenerAdded { id: ListenerId },
    /// Fired when a state listener is unsubscribed.
    ListenerRemoved { id: ListenerId },
}
