// Measurement samples as consumed by the alignment engine
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One sample: civil wall-clock timestamp plus value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueWithTimestamp {
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

impl ValueWithTimestamp {
    pub fn new(timestamp: NaiveDateTime, value: f64) -> Self {
        Self { timestamp, value }
    }

    pub fn scaled(self, factor: f64) -> Self {
        Self {
            value: self.value * factor,
            ..self
        }
    }
}

pub type MeasurementEntry = ValueWithTimestamp;
