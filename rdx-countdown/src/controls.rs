//! Which controls a host should offer for the current state.

use crate::events::{Snapshot, Status};
use serde::Serialize;
use std::fmt;

/// The action bound to the primary button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimaryAction {
    Start,
    Pause,
    Resume,
}

impl fmt::Display for PrimaryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PrimaryAction::Start => "Start",
            PrimaryAction::Pause => "Pause",
            PrimaryAction::Resume => "Resume",
        };
        f.pad(label)
    }
}

/// Enablement of the host's controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Controls {
    pub primary: PrimaryAction,
    /// The primary button needs a non-zero duration to act on.
    pub primary_enabled: bool,
    pub cancel_enabled: bool,
    /// The duration picker is only editable while idle.
    pub picker_enabled: bool,
}

impl Controls {
    pub fn for_snapshot(snapshot: &Snapshot) -> Self {
        let primary = match snapshot.status {
            Status::Running => PrimaryAction::Pause,
            Status::Pausing => PrimaryAction::Resume,
            Status::Idle | Status::Stop => PrimaryAction::Start,
        };
        Self {
            primary,
            primary_enabled: snapshot.elapsed_time > 0,
            cancel_enabled: snapshot.status != Status::Idle,
            picker_enabled: snapshot.status == Status::Idle,
        }
    }
}
