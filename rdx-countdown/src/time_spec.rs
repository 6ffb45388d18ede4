//! The user-selected duration, expressed as hour/minute/second fields.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

const MILLIS_PER_SECOND: u64 = 1_000;

/// Hour, minute and second fields picked by the user.
///
/// The fields are not validated. Values outside the picker ranges still
/// produce a total through plain arithmetic, so callers that care should go
/// through [`TimeField::clamp`] first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSpec {
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl TimeSpec {
    pub fn new(hour: u32, minute: u32, second: u32) -> Self {
        Self {
            hour,
            minute,
            second,
        }
    }

    /// Total duration in milliseconds.
    pub fn value(&self) -> u64 {
        let seconds =
            u64::from(self.hour) * 3600 + u64::from(self.minute) * 60 + u64::from(self.second);
        seconds * MILLIS_PER_SECOND
    }

    /// Stores a raw value into one field.
    pub fn set(&mut self, field: TimeField, value: u32) {
        match field {
            TimeField::Hour => self.hour = value,
            TimeField::Minute => self.minute = value,
            TimeField::Second => self.second = value,
        }
    }

    pub fn get(&self, field: TimeField) -> u32 {
        match field {
            TimeField::Hour => self.hour,
            TimeField::Minute => self.minute,
            TimeField::Second => self.second,
        }
    }

    /// Returns a copy with every field clamped to its picker range.
    pub fn clamped(&self) -> Self {
        Self {
            hour: TimeField::Hour.clamp(self.hour),
            minute: TimeField::Minute.clamp(self.minute),
            second: TimeField::Second.clamp(self.second),
        }
    }
}

/// One slider of the duration picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeField {
    Hour,
    Minute,
    Second,
}

impl TimeField {
    pub const ALL: [TimeField; 3] = [TimeField::Hour, TimeField::Minute, TimeField::Second];

    /// Short label shown next to the slider.
    pub fn label(self) -> &'static str {
        match self {
            TimeField::Hour => "H",
            TimeField::Minute => "M",
            TimeField::Second => "S",
        }
    }

    /// Inclusive slider range. Minutes and seconds accept 60.
    pub fn range(self) -> RangeInclusive<u32> {
        match self {
            TimeField::Hour => 0..=24,
            TimeField::Minute | TimeField::Second => 0..=60,
        }
    }

    pub fn clamp(self, value: u32) -> u32 {
        let range = self.range();
        value.clamp(*range.start(), *range.end())
    }
}
