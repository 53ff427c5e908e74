use std::collections::HashMap;
use crate::attributes::SessionAttributes;

/// A guard: a side-effect-free predicate over the context.
pub type GuardFn<D> = Box<dyn Fn(&SessionAttributes<D>) -> bool + Send + Sync>;

/// A prepare or after operation. May mutate the context; returns an error
/// string on failure. Operations doing I/O enforce their own deadlines.
pub type EffectFn<D> = Box<dyn Fn(&mut SessionAttributes<D>) -> Result<(), String> + Send + Sync>;

/// Named guards and effects that transitions refer to.
///
/// Transitions carry operation names, never closures, so the builder can
/// check every reference before the machine is used.
pub struct OperationRegistry<D> {
    guards:  HashMap<String, GuardFn<D>>,
    effects: HashMap<String, EffectFn<D>>,
}

impl<D> OperationRegistry<D> {
    pub fn new() -> Self {
        Self { guards: HashMap::new(), effects: HashMap::new() }
    }

    /// Register a guard. A later registration under the same name replaces it.
    pub fn register_guard(&mut self, name: impl Into<String>, guard: GuardFn<D>) {
        self.guards.insert(name.into(), guard);
    }

    /// Register an effect usable as either prepare or after operation.
    pub fn register_effect(&mut self, name: impl Into<String>, effect: EffectFn<D>) {
        self.effects.insert(name.into(), effect);
    }

    pub fn has_guard(&self, name: &str) -> bool {
        self.guards.contains_key(name)
    }

    pub fn has_effect(&self, name: &str) -> bool {
        self.effects.contains_key(name)
    }

    /// Evaluate a guard. An unknown name evaluates false; the builder rejects
    /// such references, so this only happens for hand-assembled tables.
    pub fn check(&self, name: &str, attrs: &SessionAttributes<D>) -> bool {
        match self.guards.get(name) {
            Some(guard) => guard(attrs),
            None        => false,
        }
    }

    /// Run an effect against the context.
    pub fn run(&self, name: &str, attrs: &mut SessionAttributes<D>) -> Result<(), String> {
        match self.effects.get(name) {
            Some(effect) => effect(attrs),
            None         => Err(format!("Operation '{}' not found in registry", name)),
        }
    }

    pub fn guard_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.guards.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn effect_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.effects.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl<D> Default for OperationRegistry<D> {
    fn default() -> Self { Self::new() }
}
