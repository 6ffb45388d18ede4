//! Contains the building blocks of a countdown.
//!
//! This module provides the time-driven interpolation that produces the
//! remaining-time value and the state machine that owns it. The
//! `CountdownEngine` wraps these components and drives them from a ticker.

pub mod interpolation;
pub mod timer;
