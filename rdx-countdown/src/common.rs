//! Contains common, primitive types shared across the countdown engine.
//!
//! This module defines the identifiers used to track subscribed listeners and
//! individual countdown runs. Using distinct types keeps listener handles and
//! run generations from being confused with plain integers.

use serde::Serialize;
use slotmap::new_key_type;
use std::fmt;

new_key_type! {
    /// Uniquely and safely identifies a subscribed state listener.
    ///
    /// Returned by `CountdownEngine::subscribe` and handed back to
    /// `CountdownEngine::unsubscribe`. Keys are never reused, so a stale
    /// handle can not remove somebody else's listener.
    pub struct ListenerId;
}

/// Identifies one continuous stretch of interpolation.
///
/// Every start, pause, resume, cancel or completion moves the timer to a new
/// run. Ticks scheduled for an older run are discarded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RunId(pub u64);

impl RunId {
    /// Returns the id that follows this one.
    pub fn next(self) -> Self {
        RunId(self.0.wrapping_add(1))
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run#{}", self.0)
    }
}
