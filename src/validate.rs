//! Static checks of a compiled machine against the trigger catalog of the
//! language-understanding front end.
//!
//! None of these are fatal to `build()`: a machine with unreachable states
//! still runs. They are meant for CI and the `check_definition` demo.

use std::collections::BTreeSet;
use serde::Deserialize;
use crate::attributes::Domain;
use crate::machine::CompiledMachine;
use crate::transitions::SourceRef;
use crate::triggers::Trigger;
use crate::types::State;

/// The set of triggers the front end can emit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerCatalog {
    triggers: BTreeSet<Trigger>,
}

#[derive(Deserialize)]
struct IntentSchema {
    intents: Vec<IntentEntry>,
}

#[derive(Deserialize)]
struct IntentEntry {
    intent: String,
}

impl TriggerCatalog {
    pub fn new<T: Into<Trigger>>(triggers: impl IntoIterator<Item = T>) -> Self {
        Self { triggers: triggers.into_iter().map(Into::into).collect() }
    }

    /// Reads an intent schema of the form `{"intents": [{"intent": "..."}]}`.
    pub fn from_intent_schema(json: &str) -> Result<Self, serde_json::Error> {
        let schema: IntentSchema = serde_json::from_str(json)?;
        Ok(Self::new(schema.intents.into_iter().map(|i| i.intent)))
    }

    /// Drops triggers the machine is not expected to handle, e.g. platform
    /// built-ins answered elsewhere.
    pub fn ignoring<T: Into<Trigger>>(mut self, ignored: impl IntoIterator<Item = T>) -> Self {
        for trigger in ignored {
            self.triggers.remove(&trigger.into());
        }
        self
    }

    pub fn contains(&self, trigger: &Trigger) -> bool {
        self.triggers.contains(trigger)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Trigger> {
        self.triggers.iter()
    }

    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// A transition uses a trigger the front end never emits.
    UnknownTrigger(Trigger),
    /// The front end emits a trigger no transition handles.
    UnhandledTrigger(Trigger),
    /// Nothing leads into this state.
    NoInbound(State),
    /// Nothing leads out of this non-terminal state.
    NoOutbound(State),
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::UnknownTrigger(t)   => write!(f, "trigger {} is not in the catalog", t),
            Self::UnhandledTrigger(t) => write!(f, "catalog trigger {} is never handled", t),
            Self::NoInbound(s)        => write!(f, "state {} has no inbound transitions", s),
            Self::NoOutbound(s)       => write!(f, "state {} has no outbound transitions", s),
        }
    }
}

/// Checks trigger coverage in both directions and state connectivity.
/// The initial state needs no inbound transition; terminal states need no
/// outbound one. Violations come out in a stable order.
pub fn validate<D: Domain>(machine: &CompiledMachine<D>, catalog: &TriggerCatalog) -> Vec<Violation> {
    let mut violations = Vec::new();
    let table = machine.table();

    for trigger in table.triggers() {
        if !catalog.contains(trigger) {
            violations.push(Violation::UnknownTrigger(trigger.clone()));
        }
    }
    for trigger in catalog.iter() {
        if table.candidates(trigger).is_empty() {
            violations.push(Violation::UnhandledTrigger(trigger.clone()));
        }
    }

    let any_wildcard = table.iter().any(|t| t.source == SourceRef::Any);
    for state in machine.state_names() {
        if state != *machine.initial() && !table.iter().any(|t| t.dest == state) {
            violations.push(Violation::NoInbound(state.clone()));
        }
        if !machine.is_terminal(&state) && !any_wildcard && !table.iter().any(|t| t.source.includes(&state)) {
            violations.push(Violation::NoOutbound(state));
        }
    }

    for v in &violations {
        tracing::debug!(violation = %v, "definition check");
    }
    violations
}
