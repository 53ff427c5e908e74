use crate::attributes::{Domain, SessionAttributes};
use crate::response::Response;
use crate::transitions::TransitionDecl;

/// The contract every dialogue state must fulfill.
///
/// # Implementing a State
///
/// 1. `name()` is unique within a machine and never changes.
/// 2. `respond()` only reads the context; anything that must change the
///    context belongs in a transition's prepare or after operation.
/// 3. `transitions()` lists the descriptors declared next to this state,
///    usually inbound ones (see `TransitionDecl`). Order matters: within a
///    trigger, the first declared candidate that passes its guards wins.
/// 4. Return `true` from `is_terminal()` for states that end the
///    conversation; they are exempt from the outbound-transition check.
pub trait DialogState<D: Domain>: Send + Sync {
    fn name(&self) -> &str;

    /// Produce the reply for a conversation that has just entered this state.
    fn respond(&self, attrs: &SessionAttributes<D>) -> Response;

    fn transitions(&self) -> Vec<TransitionDecl> {
        Vec::new()
    }

    fn is_terminal(&self) -> bool {
        false
    }
}

/// Response operation of a closure-backed state.
pub type ResponseFn<D> = Box<dyn Fn(&SessionAttributes<D>) -> Response + Send + Sync>;

/// A state assembled from a closure, for small machines and tests.
pub struct FnState<D> {
    name:        String,
    respond:     ResponseFn<D>,
    transitions: Vec<TransitionDecl>,
    terminal:    bool,
}

impl<D: Domain> FnState<D> {
    pub fn new(
        name:    impl Into<String>,
        respond: impl Fn(&SessionAttributes<D>) -> Response + Send + Sync + 'static,
    ) -> Self {
        Self {
            name:        name.into(),
            respond:     Box::new(respond),
            transitions: Vec::new(),
            terminal:    false,
        }
    }

    /// A state whose response is a fixed utterance.
    pub fn speaking(name: impl Into<String>, speech: impl Into<String>) -> Self {
        let speech = speech.into();
        Self::new(name, move |_| Response::new(speech.clone(), speech.clone()))
    }

    pub fn transition(mut self, decl: TransitionDecl) -> Self {
        self.transitions.push(decl); self
    }

    pub fn terminal(mut self) -> Self {
        self.terminal = true; self
    }
}

impl<D: Domain> DialogState<D> for FnState<D> {
    fn name(&self) -> &str { &self.name }

    fn respond(&self, attrs: &SessionAttributes<D>) -> Response {
        (self.respond)(attrs)
    }

    fn transitions(&self) -> Vec<TransitionDecl> {
        self.transitions.clone()
    }

    fn is_terminal(&self) -> bool { self.terminal }
}
