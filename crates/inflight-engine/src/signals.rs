//! Process-wide notification registers
//!
//! Each register keeps only the most recent value; writers overwrite each
//! other. Clients poll them through the dispatcher.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use serde::Serialize;

/// Latest message sent to every client
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct Broadcast {
    pub message: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

/// Latest booking cancellation
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct Cancellation {
    /// Username of the passenger who cancelled
    pub passenger: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

#[derive(Default)]
pub struct Signals {
    broadcast: RwLock<Option<Broadcast>>,
    cancellation: RwLock<Option<Cancellation>>,
    survey: AtomicBool,
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

impl Signals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn broadcast(&self, message: impl Into<String>) {
        *self.broadcast.write() = Some(Broadcast {
            message: message.into(),
            timestamp: now_millis(),
        });
    }

    pub fn latest_broadcast(&self) -> Option<Broadcast> {
        self.broadcast.read().clone()
    }

    pub fn register_cancellation(&self, passenger: impl Into<String>) {
        *self.cancellation.write() = Some(Cancellation {
            passenger: passenger.into(),
            timestamp: now_millis(),
        });
    }

    pub fn last_cancellation(&self) -> Option<Cancellation> {
        self.cancellation.read().clone()
    }

    /// Raise the survey flag; it stays raised for the life of the process
    pub fn trigger_survey(&self) {
        self.survey.store(true, Ordering::Release);
    }

    pub fn survey_triggered(&self) -> bool {
        self.survey.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_start_empty_and_overwrite() {
        let signals = Signals::new();
        assert!(signals.latest_broadcast().is_none());
        assert!(!signals.survey_triggered());

        signals.broadcast("fasten seatbelts");
        signals.broadcast("docking in 5");
        let latest = signals.latest_broadcast().unwrap();
        assert_eq!(latest.message, "docking in 5");
        assert!(latest.timestamp > 0);

        signals.trigger_survey();
        signals.trigger_survey();
        assert!(signals.survey_triggered());
    }
}
