use std::collections::{HashMap, HashSet};
use crate::attributes::{Domain, SessionAttributes};
use crate::config::SkillConfig;
use crate::error::{DefinitionError, OperationKind};
use crate::machine::CompiledMachine;
use crate::operations::OperationRegistry;
use crate::response::Response;
use crate::states::{DialogState, FnState};
use crate::transitions::{Transition, TransitionDecl, TransitionTable};
use crate::types::{State, INITIAL_STATE};

/// Assembles a `CompiledMachine` from state declarations and named operations.
///
/// # Example
/// ```
/// use dialogsm::{FnState, MachineBuilder, Response, TransitionDecl};
///
/// #[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// struct Nothing {}
/// impl dialogsm::Domain for Nothing {}
///
/// let machine = MachineBuilder::<Nothing>::new()
///     .state(FnState::speaking("greeted", "Hello again")
///         .transition(TransitionDecl::on("Hello").from("initial")))
///     .build()
///     .expect("valid definition");
/// assert_eq!(machine.state_names().len(), 2);
/// ```
pub struct MachineBuilder<D> {
    config:     SkillConfig,
    initial:    State,
    states:     Vec<Box<dyn DialogState<D>>>,
    extra:      Vec<TransitionDecl>,
    operations: OperationRegistry<D>,
}

impl<D: Domain> MachineBuilder<D> {
    pub fn new() -> Self {
        Self {
            config:     SkillConfig::default(),
            initial:    State::initial(),
            states:     Vec::new(),
            extra:      Vec::new(),
            operations: OperationRegistry::new(),
        }
    }

    /// Used for the implicit initial state's welcome response.
    pub fn config(mut self, config: SkillConfig) -> Self {
        self.config = config; self
    }

    /// Rename the state new conversations start in. A non-default initial
    /// state must be declared explicitly.
    pub fn initial(mut self, state: impl Into<State>) -> Self {
        self.initial = state.into(); self
    }

    pub fn state(mut self, state: impl DialogState<D> + 'static) -> Self {
        self.states.push(Box::new(state)); self
    }

    pub fn boxed_state(mut self, state: Box<dyn DialogState<D>>) -> Self {
        self.states.push(state); self
    }

    /// A free-standing transition naming both endpoints. Extra transitions are
    /// ordered after every state-declared one.
    pub fn transition(mut self, decl: TransitionDecl) -> Self {
        self.extra.push(decl); self
    }

    pub fn guard(
        mut self,
        name:  impl Into<String>,
        guard: impl Fn(&SessionAttributes<D>) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.operations.register_guard(name, Box::new(guard));
        self
    }

    pub fn effect(
        mut self,
        name:   impl Into<String>,
        effect: impl Fn(&mut SessionAttributes<D>) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        self.operations.register_effect(name, Box::new(effect));
        self
    }

    /// Compiles the declarations. Pure apart from the returned error.
    pub fn build(mut self) -> Result<CompiledMachine<D>, DefinitionError> {
        let mut names: HashSet<State> = HashSet::new();
        for state in &self.states {
            let name = State::new(state.name());
            if !names.insert(name.clone()) {
                return Err(DefinitionError::DuplicateState(name));
            }
        }

        if !names.contains(&self.initial) {
            if self.initial.as_str() != INITIAL_STATE {
                return Err(DefinitionError::UnknownInitial(self.initial));
            }
            let config = self.config.clone();
            self.states.push(Box::new(
                FnState::<D>::new(INITIAL_STATE, move |_| Response::welcome(&config))
            ));
            names.insert(self.initial.clone());
        }

        let mut transitions: Vec<Transition> = Vec::new();
        for state in &self.states {
            let owner = State::new(state.name());
            for decl in state.transitions() {
                transitions.extend(decl.normalize(Some(&owner))?);
            }
        }
        for decl in &self.extra {
            transitions.extend(decl.normalize(None)?);
        }

        for t in &transitions {
            check_references(t, &names, &self.operations)?;
        }
        check_ambiguity(&transitions)?;

        let mut table = TransitionTable::new();
        for t in transitions {
            table.push(t);
        }

        tracing::info!(
            states = self.states.len(),
            transitions = table.len(),
            initial = %self.initial,
            "dialogue machine compiled"
        );
        Ok(CompiledMachine::new(self.states, self.initial, table, self.operations))
    }
}

impl<D: Domain> Default for MachineBuilder<D> {
    fn default() -> Self { Self::new() }
}

fn check_references<D>(
    t:          &Transition,
    names:      &HashSet<State>,
    operations: &OperationRegistry<D>,
) -> Result<(), DefinitionError> {
    if !names.contains(&t.dest) {
        return Err(DefinitionError::UnknownDestination {
            trigger: t.trigger.clone(),
            dest:    t.dest.clone(),
        });
    }
    if let Some(source) = t.source.states().iter().find(|s| !names.contains(*s)) {
        return Err(DefinitionError::UnknownSource {
            trigger:      t.trigger.clone(),
            source_state: source.clone(),
            dest:         t.dest.clone(),
        });
    }

    let unknown = |kind: OperationKind, name: &str| DefinitionError::UnknownOperation {
        trigger: t.trigger.clone(),
        dest:    t.dest.clone(),
        kind,
        name:    name.to_string(),
    };
    if let Some(guard) = t.guards.iter().find(|g| !operations.has_guard(g)) {
        return Err(unknown(OperationKind::Guard, guard));
    }
    if let Some(prepare) = t.prepare.as_deref().filter(|p| !operations.has_effect(p)) {
        return Err(unknown(OperationKind::Prepare, prepare));
    }
    if let Some(after) = t.after.as_deref().filter(|a| !operations.has_effect(a)) {
        return Err(unknown(OperationKind::After, after));
    }
    Ok(())
}

/// Best-effort: two unguarded transitions on the same trigger from the same
/// source can never be told apart.
fn check_ambiguity(transitions: &[Transition]) -> Result<(), DefinitionError> {
    let mut unguarded: HashMap<(String, String), &Transition> = HashMap::new();
    for t in transitions.iter().filter(|t| t.guards.is_empty()) {
        let key = (t.trigger.to_string(), t.source.to_string());
        if let Some(first) = unguarded.insert(key, t) {
            return Err(DefinitionError::AmbiguousTransition {
                trigger:      t.trigger.clone(),
                source_state: t.source.to_string(),
                first:        first.dest.clone(),
                second:       t.dest.clone(),
            });
        }
    }
    Ok(())
}
