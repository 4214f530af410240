//! Cooperative one-shot timers owned by the engine.
//!
//! Nothing here runs on its own: the engine asks for due timers on every
//! tick. Cancelling removes the deadline outright, so a cancelled timer can
//! never fire later.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerId {
    /// Periodic health and weather check.
    AwarenessSweep,
    /// Auto-dismiss of the visible message.
    MessageDismiss,
    /// Delayed "I'm back" greeting after leaving idle.
    WakeGreeting,
}

#[derive(Debug, Clone, Default)]
pub struct TimerSet {
    deadlines: BTreeMap<TimerId, NaiveDateTime>,
}

impl TimerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `id` for `at`, replacing any earlier deadline for the same id.
    pub fn schedule(&mut self, id: TimerId, at: NaiveDateTime) {
        self.deadlines.insert(id, at);
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.deadlines.remove(&id).is_some()
    }

    pub fn cancel_all(&mut self) {
        self.deadlines.clear();
    }

    pub fn is_armed(&self, id: TimerId) -> bool {
        self.deadlines.contains_key(&id)
    }

    pub fn deadline(&self, id: TimerId) -> Option<NaiveDateTime> {
        self.deadlines.get(&id).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }

    /// Remove and return every timer whose deadline is at or before `now`,
    /// earliest first.
    pub fn take_due(&mut self, now: NaiveDateTime) -> Vec<TimerId> {
        let mut due: Vec<(NaiveDateTime, TimerId)> = self
            .deadlines
            .iter()
            .filter(|(_, at)| **at <= now)
            .map(|(id, at)| (*at, *id))
            .collect();
        due.sort();
        for (_, id) in &due {
            self.deadlines.remove(id);
        }
        due.into_iter().map(|(_, id)| id).collect()
    }
}
