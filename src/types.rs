use serde::{Deserialize, Serialize};

/// Name of the distinguished state every new conversation starts in.
pub const INITIAL_STATE: &str = "initial";

/// A named state in a dialogue machine.
///
/// States are identified by their string name only. Each state is bound to a
/// response operation when the machine is built (see `states::DialogState`).
///
/// # Defining a State
///
/// ```
/// use dialogsm::State;
/// let describing = State::new("describing");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct State(pub String);

impl State {
    /// Create a new state with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the string name of this state.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The state a fresh conversation starts in.
    pub fn initial() -> Self {
        Self::new(INITIAL_STATE)
    }

    pub fn is_initial(&self) -> bool {
        self.0 == INITIAL_STATE
    }
}

impl Default for State {
    fn default() -> Self {
        Self::initial()
    }
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for State {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for State {
    fn from(name: String) -> Self {
        Self(name)
    }
}
