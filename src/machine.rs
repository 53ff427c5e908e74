use std::collections::HashMap;
use std::fmt::Write as _;
use crate::attributes::{Domain, SessionAttributes};
use crate::error::DialogError;
use crate::operations::OperationRegistry;
use crate::response::Response;
use crate::states::DialogState;
use crate::transitions::{SourceRef, TransitionTable};
use crate::types::State;

/// A dialogue machine ready for use.
///
/// Immutable once built and free of per-session data, so one instance is
/// shared behind an `Arc` by every session of the skill.
pub struct CompiledMachine<D> {
    states:     Vec<Box<dyn DialogState<D>>>,
    index:      HashMap<State, usize>,
    initial:    State,
    table:      TransitionTable,
    operations: OperationRegistry<D>,
}

impl<D: Domain> CompiledMachine<D> {
    pub(crate) fn new(
        states:     Vec<Box<dyn DialogState<D>>>,
        initial:    State,
        table:      TransitionTable,
        operations: OperationRegistry<D>,
    ) -> Self {
        let index = states.iter().enumerate()
            .map(|(i, s)| (State::new(s.name()), i))
            .collect();
        Self { states, index, initial, table, operations }
    }

    pub fn initial(&self) -> &State {
        &self.initial
    }

    pub fn contains(&self, state: &State) -> bool {
        self.index.contains_key(state)
    }

    /// State names in declaration order.
    pub fn state_names(&self) -> Vec<State> {
        self.states.iter().map(|s| State::new(s.name())).collect()
    }

    pub fn is_terminal(&self, state: &State) -> bool {
        self.handler(state).is_some_and(|s| s.is_terminal())
    }

    pub fn table(&self) -> &TransitionTable {
        &self.table
    }

    pub fn operations(&self) -> &OperationRegistry<D> {
        &self.operations
    }

    fn handler(&self, state: &State) -> Option<&dyn DialogState<D>> {
        self.index.get(state).map(|&i| self.states[i].as_ref())
    }

    /// Runs the response operation of the context's current state.
    pub fn respond(&self, attrs: &SessionAttributes<D>) -> Result<Response, DialogError> {
        let handler = self.handler(&attrs.state)
            .ok_or_else(|| DialogError::InvalidContext(format!("unknown state: {}", attrs.state)))?;
        Ok(handler.respond(attrs))
    }

    /// Human-readable listing of states and transitions grouped by trigger.
    pub fn describe(&self) -> String {
        let names: Vec<String> = self.state_names().into_iter().map(|s| s.0).collect();
        let mut out = format!("Machine states:\n\t{}\n\nTriggers and transitions:\n", names.join(", "));

        for trigger in self.table.triggers() {
            let _ = writeln!(out, "Trigger: {}", trigger);
            for t in self.table.candidates(trigger) {
                let _ = write!(out, "\t{} -> {}", t.source, t.dest);
                if let Some(prepare) = &t.prepare {
                    let _ = write!(out, ", prepare: {}", prepare);
                }
                if !t.guards.is_empty() {
                    let _ = write!(out, ", guards: [{}]", t.guards.join(", "));
                }
                if let Some(after) = &t.after {
                    let _ = write!(out, ", after: {}", after);
                }
                out.push('\n');
            }
        }
        out
    }

    /// Graphviz rendering. Wildcard transitions are drawn from a `*` node.
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph dialogue {\n    rankdir=LR;\n");
        let _ = writeln!(out, "    \"{}\" [shape=doublecircle];", self.initial);
        for state in self.states.iter().filter(|s| s.is_terminal()) {
            let _ = writeln!(out, "    \"{}\" [shape=box];", state.name());
        }

        for t in self.table.iter() {
            let source = match &t.source {
                SourceRef::Any => "*".to_string(),
                other          => other.to_string(),
            };
            let mut label = t.trigger.to_string();
            if !t.guards.is_empty() {
                let _ = write!(label, " [{}]", t.guards.join(" && "));
            }
            let _ = writeln!(out, "    \"{}\" -> \"{}\" [label=\"{}\"];", source, t.dest, label);
        }
        out.push_str("}\n");
        out
    }
}
