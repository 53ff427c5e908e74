use serde::{Deserialize, Serialize};

/// A named trigger driving a transition attempt.
///
/// Triggers correspond one-to-one with the intents a front-end recognises.
/// Intent extraction happens upstream; the engine only sees the name. The
/// library ships constructors for the common conversational intents, but any
/// string is a valid trigger.
///
/// ```
/// use dialogsm::Trigger;
/// let t = Trigger::new("Search");
/// assert_eq!(t, Trigger::search());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trigger(pub String);

impl Trigger {
    /// Create a new trigger with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the string name of this trigger.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    // ── Well-known trigger constructors ─────────────────────────────────

    // Confirmation
    pub fn yes()    -> Self { Self::new("Yes") }
    pub fn no()     -> Self { Self::new("No") }

    // Leaving
    pub fn cancel() -> Self { Self::new("Cancel") }
    pub fn stop()   -> Self { Self::new("Stop") }

    // Assistance and navigation
    pub fn help()   -> Self { Self::new("Help") }
    pub fn next()   -> Self { Self::new("Next") }
    pub fn search() -> Self { Self::new("Search") }
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Trigger {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Trigger {
    fn from(name: String) -> Self {
        Self(name)
    }
}
