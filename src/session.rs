use std::sync::Arc;
use chrono::Utc;
use serde_json::Value;
use crate::attributes::{Captured, Domain, SessionAttributes};
use crate::engine::resolve;
use crate::error::DialogError;
use crate::machine::CompiledMachine;
use crate::profile::Profile;
use crate::response::Response;
use crate::trace::{Outcome, Trace, TraceEntry};
use crate::triggers::Trigger;

/// One ongoing conversation: its context plus a handle on the shared machine.
pub struct Session<D> {
    id:         String,
    machine:    Arc<CompiledMachine<D>>,
    attributes: SessionAttributes<D>,
    fresh:      bool,
    turns:      usize,
    trace:      Trace,
}

impl<D: Domain> Session<D> {
    /// A session in the machine's initial state with every field at its default.
    pub fn new(id: impl Into<String>, machine: Arc<CompiledMachine<D>>, trace_limit: usize) -> Self {
        let attributes = SessionAttributes::new().with_state(machine.initial().clone());
        Self {
            id: id.into(),
            machine,
            attributes,
            fresh: true,
            turns: 0,
            trace: Trace::new(trace_limit),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn attributes(&self) -> &SessionAttributes<D> {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut SessionAttributes<D> {
        &mut self.attributes
    }

    pub fn machine(&self) -> &CompiledMachine<D> {
        &self.machine
    }

    /// True until the first event has been handled.
    pub fn is_fresh(&self) -> bool {
        self.fresh
    }

    pub fn turns(&self) -> usize {
        self.turns
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    /// Sets the one-time first-contact fields. Only has an effect on a fresh
    /// session.
    pub fn apply_profile(&mut self, profile: Option<&Profile>) {
        if self.fresh {
            self.attributes.fields.apply_profile(profile);
        }
    }

    /// Adopts the attributes the caller persisted after the previous turn.
    pub fn restore(&mut self, persisted: &Value) -> Result<(), DialogError> {
        let mut candidate = self.attributes.clone();
        let replaced = candidate.restore(persisted)?;
        if !self.machine.contains(&candidate.state) {
            return Err(DialogError::InvalidContext(format!("unknown state: {}", candidate.state)));
        }
        if replaced {
            tracing::debug!(session = %self.id, state = %candidate.state, "context rebuilt from persisted attributes");
        }
        self.attributes = candidate;
        Ok(())
    }

    /// Session start: answers from the current state without a transition.
    pub fn start(&mut self) -> Result<Response, DialogError> {
        self.fresh = false;
        self.record(None, Outcome::Started);
        self.respond()
    }

    /// One turn: merges captured values, resolves the trigger, and answers
    /// from the destination state.
    ///
    /// Captured values are merged before resolution and are kept even when no
    /// transition accepts the turn, so values accumulate across turns. A
    /// recoverable failure restores everything else to how it was after the
    /// merge. After a post-effect failure the new state stands and the error
    /// carries the context to persist.
    pub fn turn(&mut self, trigger: Trigger, captured: &Captured) -> Result<Response, DialogError> {
        self.fresh = false;
        self.turns += 1;

        self.attributes.begin_turn(trigger.clone(), captured);

        match resolve(&self.machine, &mut self.attributes, &trigger) {
            Ok(dest) => {
                self.record(Some(trigger), Outcome::Committed(dest));
                self.respond()
            }
            Err(e) => {
                let outcome = match &e {
                    DialogError::SideEffect { message, .. } => Outcome::SideEffectFailed(message.clone()),
                    DialogError::PostEffect { message, .. } => Outcome::PostEffectFailed(message.clone()),
                    _                                       => Outcome::NoTransition,
                };
                self.record(Some(trigger), outcome);
                Err(e)
            }
        }
    }

    /// The transmitted projection of the current context.
    pub fn persisted(&self) -> Result<Value, DialogError> {
        self.attributes.to_persisted()
    }

    fn respond(&self) -> Result<Response, DialogError> {
        let response = self.machine.respond(&self.attributes)?;
        Ok(response.with_context(self.persisted()?))
    }

    fn record(&mut self, trigger: Option<Trigger>, outcome: Outcome) {
        self.trace.record(TraceEntry {
            turn:      self.turns,
            state:     self.attributes.state.clone(),
            trigger,
            outcome,
            timestamp: Utc::now(),
        });
    }
}
