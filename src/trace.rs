use std::collections::VecDeque;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::triggers::Trigger;
use crate::types::State;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Started,
    Committed(State),
    NoTransition,
    SideEffectFailed(String),
    PostEffectFailed(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEntry {
    pub turn:      usize,
    pub state:     State,
    pub trigger:   Option<Trigger>,
    pub outcome:   Outcome,
    pub timestamp: DateTime<Utc>,
}

/// Most recent resolution outcomes of one session, oldest first.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Trace {
    entries: VecDeque<TraceEntry>,
    limit:   usize,
}

impl Trace {
    pub fn new(limit: usize) -> Self {
        Self { entries: VecDeque::new(), limit }
    }

    pub fn record(&mut self, entry: TraceEntry) {
        if self.limit == 0 {
            return;
        }
        while self.entries.len() >= self.limit {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn entries(&self) -> impl Iterator<Item = &TraceEntry> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&TraceEntry> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serializes the trace to a pretty-printed JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self.entries)
            .unwrap_or_else(|_| "[]".to_string())
    }
}
