use serde_json::Value;
use thiserror::Error;
use crate::types::State;
use crate::triggers::Trigger;

/// Which kind of registered operation a transition refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Guard,
    Prepare,
    After,
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Guard   => write!(f, "guard"),
            Self::Prepare => write!(f, "prepare"),
            Self::After   => write!(f, "after"),
        }
    }
}

/// A malformed machine definition. Raised only by `MachineBuilder::build`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("State declared twice: {0}")]
    DuplicateState(State),

    #[error("Initial state {0} is not declared")]
    UnknownInitial(State),

    #[error("Transition on {trigger} needs both a source and a destination")]
    IncompleteTransition { trigger: Trigger },

    #[error("Transition {trigger} -> {dest}: unknown destination state")]
    UnknownDestination { trigger: Trigger, dest: State },

    #[error("Transition {trigger} -> {dest}: unknown source state {source_state}")]
    UnknownSource { trigger: Trigger, source_state: State, dest: State },

    #[error("Transition {trigger} -> {dest}: {kind} operation '{name}' is not registered")]
    UnknownOperation { trigger: Trigger, dest: State, kind: OperationKind, name: String },

    #[error("Transitions {trigger} from {source_state} to {first} and {second} have no guard to tell them apart")]
    AmbiguousTransition { trigger: Trigger, source_state: String, first: State, second: State },
}

#[derive(Debug, Error)]
pub enum DialogError {
    #[error("Invalid machine definition: {0}")]
    Definition(#[from] DefinitionError),

    #[error("No transition: {from} + {trigger} has no eligible transition")]
    NoTransition { from: State, trigger: Trigger },

    #[error("Prepare operation '{operation}' failed on {trigger}: {message}")]
    SideEffect { trigger: Trigger, operation: String, message: String },

    #[error("After operation '{operation}' failed entering {state}: {message}")]
    PostEffect { state: State, operation: String, message: String, context: Option<Value> },

    #[error("Unknown event type: {0}")]
    UnknownEventType(String),

    #[error("Malformed event: {0}")]
    MalformedEvent(String),

    #[error("Invalid session attributes: {0}")]
    InvalidContext(String),

    #[error("Session pool capacity must be at least 1")]
    InvalidCapacity,
}

impl DialogError {
    /// Per-request failures that leave the session usable and are answered
    /// with the "not understood" fallback.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::NoTransition { .. } | Self::SideEffect { .. })
    }

    /// The transmitted context of a committed transition whose after
    /// operation failed. Callers that echo attributes back should persist it.
    pub fn context(&self) -> Option<&Value> {
        match self {
            Self::PostEffect { context, .. } => context.as_ref(),
            _ => None,
        }
    }
}
