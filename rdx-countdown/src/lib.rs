//! # Countdown
//!
//! A tick-driven countdown timer engine for Rust.
//!
//! The engine tracks a user-selected duration, counts it down in wall-clock
//! time and reports the remaining time to whoever is rendering it. Hosts feed
//! it intents (set duration, start, pause, resume, cancel) and read its state
//! back through queries, listeners or event streams.
//!
//! ## Core Concepts
//!
//! - **TimeSpec**: hour/minute/second fields picked by the user, converted to
//!   a total in milliseconds.
//! - **Interpolation**: a value that descends from the remaining time to zero
//!   at one unit per millisecond. The interpolated value *is* the remaining
//!   time.
//! - **CountdownTimer**: the state machine (`Idle`, `Running`, `Pausing`,
//!   transient `Stop`) that owns the single active interpolation.
//! - **CountdownEngine**: a cloneable handle that owns the timer, samples it
//!   from a ticker task while running, and notifies listeners synchronously
//!   after every change.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use countdown::prelude::*;
//! use tokio::sync::broadcast::error::RecvError;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // 1. Create the engine with the default ~60Hz resolution.
//!     let engine = CountdownEngine::new(CountdownConfig::default());
//!
//!     // 2. Register a renderer.
//!     let _id = engine
//!         .subscribe(|snapshot| {
//!             println!("{} {}", snapshot.status, DigitDisplay::from(snapshot));
//!         })
//!         .await;
//!
//!     // 3. Pick a duration and start.
//!     let mut events = engine.subscribe_events();
//!     engine.set_duration(0, 0, 10).await;
//!     engine.start().await;
//!
//!     // 4. Wait for the run to settle. Tick events may lag behind.
//!     loop {
//!         match events.recv().await {
//!             Ok(CountdownEvent::Completed { .. }) => break,
//!             Ok(_) | Err(RecvError::Lagged(_)) => {}
//!             Err(RecvError::Closed) => break,
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub const ENGINE_NAME: &str = "Countdown Engine";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Declare all the modules in the crate.
pub mod common;
pub mod components;
pub mod config;
pub mod controls;
pub mod display;
pub mod engine;
pub mod events;
pub mod time;
pub mod time_spec;

/// A prelude module for easy importing of the most common countdown types.
pub mod prelude {
    pub use crate::common::{ListenerId, RunId};
    pub use crate::config::{ClockResolution, CountdownConfig};
    pub use crate::controls::{Controls, PrimaryAction};
    pub use crate::display::{sweep_angle, DigitDisplay};
    pub use crate::engine::CountdownEngine;
    pub use crate::events::{CountdownEvent, Snapshot, Status, SystemEvent};
    pub use crate::time_spec::{TimeField, TimeSpec};
}
