use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use crate::error::DefinitionError;
use crate::triggers::Trigger;
use crate::types::State;

/// Which states a transition may leave from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceRef {
    /// Wildcard: every state.
    Any,
    One(State),
    Many(Vec<State>),
}

impl SourceRef {
    pub fn includes(&self, state: &State) -> bool {
        match self {
            Self::Any           => true,
            Self::One(s)        => s == state,
            Self::Many(states)  => states.contains(state),
        }
    }

    /// Splits a list into one reference per state.
    fn expand(&self) -> Vec<SourceRef> {
        match self {
            Self::Many(states) => states.iter().cloned().map(Self::One).collect(),
            other              => vec![other.clone()],
        }
    }

    /// Names referenced explicitly, empty for the wildcard.
    pub fn states(&self) -> &[State] {
        match self {
            Self::Any          => &[],
            Self::One(s)       => std::slice::from_ref(s),
            Self::Many(states) => states,
        }
    }
}

impl std::fmt::Display for SourceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Any          => write!(f, "*"),
            Self::One(s)       => write!(f, "{}", s),
            Self::Many(states) => {
                let names: Vec<&str> = states.iter().map(State::as_str).collect();
                write!(f, "[{}]", names.join(", "))
            }
        }
    }
}

/// A transition descriptor as written next to a state declaration.
///
/// Attached to a state, a descriptor without an explicit destination is
/// *inbound* (it leads to that state); one with `to(...)` and no `from(...)`
/// is *outbound* (it leaves that state).
///
/// ```
/// use dialogsm::{TransitionDecl, Trigger};
/// let decl = TransitionDecl::on(Trigger::yes())
///     .from_each(["one_result", "many_results"])
///     .prepare("retrieve_item");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionDecl {
    pub trigger: Trigger,
    pub source:  Option<SourceRef>,
    pub dest:    Option<State>,
    pub guards:  Vec<String>,
    pub prepare: Option<String>,
    pub after:   Option<String>,
}

impl TransitionDecl {
    pub fn on(trigger: impl Into<Trigger>) -> Self {
        Self {
            trigger: trigger.into(),
            source:  None,
            dest:    None,
            guards:  Vec::new(),
            prepare: None,
            after:   None,
        }
    }

    pub fn from(mut self, state: impl Into<State>) -> Self {
        self.source = Some(SourceRef::One(state.into())); self
    }

    pub fn from_each<S: Into<State>>(mut self, states: impl IntoIterator<Item = S>) -> Self {
        self.source = Some(SourceRef::Many(states.into_iter().map(Into::into).collect())); self
    }

    pub fn from_any(mut self) -> Self {
        self.source = Some(SourceRef::Any); self
    }

    pub fn to(mut self, state: impl Into<State>) -> Self {
        self.dest = Some(state.into()); self
    }

    /// Adds a guard. All guards must hold for the transition to commit.
    pub fn guard(mut self, name: impl Into<String>) -> Self {
        self.guards.push(name.into()); self
    }

    /// Operation run before the guards are evaluated.
    pub fn prepare(mut self, name: impl Into<String>) -> Self {
        self.prepare = Some(name.into()); self
    }

    /// Operation run after the transition commits.
    pub fn after(mut self, name: impl Into<String>) -> Self {
        self.after = Some(name.into()); self
    }

    /// Resolves the missing endpoint against the declaring state and expands
    /// source lists into one transition per source.
    pub(crate) fn normalize(&self, owner: Option<&State>) -> Result<Vec<Transition>, DefinitionError> {
        let (source, dest) = match (&self.source, &self.dest, owner) {
            (Some(source), Some(dest), _)  => (source.clone(), dest.clone()),
            (None, Some(dest), Some(owner)) => (SourceRef::One(owner.clone()), dest.clone()),
            (Some(source), None, Some(owner)) => (source.clone(), owner.clone()),
            _ => return Err(DefinitionError::IncompleteTransition { trigger: self.trigger.clone() }),
        };

        Ok(source.expand().into_iter().map(|source| Transition {
            trigger: self.trigger.clone(),
            source,
            dest:    dest.clone(),
            guards:  self.guards.clone(),
            prepare: self.prepare.clone(),
            after:   self.after.clone(),
        }).collect())
    }
}

/// A compiled transition. `source` is either a single state or the wildcard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub trigger: Trigger,
    pub source:  SourceRef,
    pub dest:    State,
    pub guards:  Vec<String>,
    pub prepare: Option<String>,
    pub after:   Option<String>,
}

/// Transitions indexed by trigger, each list in declaration order.
#[derive(Debug, Clone, Default)]
pub struct TransitionTable {
    by_trigger: HashMap<Trigger, Vec<Transition>>,
    order:      Vec<Trigger>,
}

impl TransitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, transition: Transition) {
        if !self.by_trigger.contains_key(&transition.trigger) {
            self.order.push(transition.trigger.clone());
        }
        self.by_trigger.entry(transition.trigger.clone())
            .or_default()
            .push(transition);
    }

    /// Candidates for a trigger in declaration order; empty when unknown.
    pub fn candidates(&self, trigger: &Trigger) -> &[Transition] {
        self.by_trigger.get(trigger).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Triggers in the order they were first declared.
    pub fn triggers(&self) -> &[Trigger] {
        &self.order
    }

    /// All transitions, grouped by trigger.
    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.order.iter().flat_map(move |t| self.candidates(t).iter())
    }

    pub fn len(&self) -> usize {
        self.by_trigger.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_trigger.is_empty()
    }
}
