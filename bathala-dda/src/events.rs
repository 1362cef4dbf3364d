//! Bounded audit log of engine activity.
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::tier::DifficultyTier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DdaEventKind {
    ScoreUpdate,
    TierChange,
    CalibrationComplete,
    SessionReset,
    ConfigReset,
    Toggle,
    DuplicateRejected,
}

/// One recorded event, stamped with the score and tier after it happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DdaEvent {
    /// Monotonic per-log counter; survives trimming so gaps reveal dropped
    /// history.
    pub sequence: u64,
    pub kind: DdaEventKind,
    pub score: f64,
    pub tier: DifficultyTier,
    pub detail: String,
}

/// Ring buffer keeping the most recent `capacity` events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    capacity: usize,
    next_sequence: u64,
    events: VecDeque<DdaEvent>,
}

impl EventLog {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            next_sequence: 0,
            events: VecDeque::with_capacity(capacity.max(1)),
        }
    }

    pub fn record(
        &mut self,
        kind: DdaEventKind,
        score: f64,
        tier: DifficultyTier,
        detail: impl Into<String>,
    ) {
        if self.events.len() == self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(DdaEvent {
            sequence: self.next_sequence,
            kind,
            score,
            tier,
            detail: detail.into(),
        });
        self.next_sequence = self.next_sequence.saturating_add(1);
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.next_sequence = 0;
    }

    pub fn iter(&self) -> impl Iterator<Item = &DdaEvent> {
        self.events.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    #[must_use]
    pub fn last(&self) -> Option<&DdaEvent> {
        self.events.back()
    }

    pub fn of_kind(&self, kind: DdaEventKind) -> impl Iterator<Item = &DdaEvent> {
        self.events.iter().filter(move |event| event.kind == kind)
    }
}
