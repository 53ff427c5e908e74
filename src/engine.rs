//! Transition resolution.
//!
//! `resolve` walks the candidates registered for a trigger in declaration
//! order. For each candidate whose source includes the current state it runs
//! the prepare operation, then the guards, against the live context; the
//! first candidate whose guards all hold is committed. Prepare mutations of a
//! rejected candidate stay in place while later candidates are tried, which is
//! why prepare operations are expected to memoise. If nothing commits, or a
//! prepare operation fails, the context is restored to the snapshot taken on
//! entry. An after operation runs only once the new state is committed, and
//! its failure does not undo the transition.

use crate::attributes::{Domain, SessionAttributes};
use crate::error::DialogError;
use crate::machine::CompiledMachine;
use crate::triggers::Trigger;
use crate::types::State;

/// Resolves `trigger` against the context's current state.
///
/// Returns the committed destination state. On `NoTransition` and
/// `SideEffect` the context is field-for-field what it was on entry.
pub fn resolve<D: Domain>(
    machine: &CompiledMachine<D>,
    attrs:   &mut SessionAttributes<D>,
    trigger: &Trigger,
) -> Result<State, DialogError> {
    let from = attrs.state.clone();
    let candidates = machine.table().candidates(trigger);
    if candidates.is_empty() {
        tracing::debug!(state = %from, trigger = %trigger, "trigger has no transitions");
        return Err(DialogError::NoTransition { from, trigger: trigger.clone() });
    }

    let snapshot = attrs.clone();
    let ops = machine.operations();

    for candidate in candidates.iter().filter(|t| t.source.includes(&from)) {
        if let Some(prepare) = &candidate.prepare {
            if let Err(message) = ops.run(prepare, attrs) {
                *attrs = snapshot;
                tracing::warn!(
                    state = %from, trigger = %trigger, operation = %prepare, error = %message,
                    "prepare operation failed, context rolled back"
                );
                return Err(DialogError::SideEffect {
                    trigger:   trigger.clone(),
                    operation: prepare.clone(),
                    message,
                });
            }
        }

        if let Some(failed) = candidate.guards.iter().find(|g| !ops.check(g, &*attrs)) {
            tracing::debug!(dest = %candidate.dest, guard = %failed, "candidate rejected");
            continue;
        }

        attrs.state = candidate.dest.clone();
        tracing::info!(from = %from, trigger = %trigger, to = %candidate.dest, "transition");

        if let Some(after) = &candidate.after {
            if let Err(message) = ops.run(after, attrs) {
                tracing::error!(
                    state = %candidate.dest, operation = %after, error = %message,
                    "after operation failed; transition stands"
                );
                return Err(DialogError::PostEffect {
                    state:     candidate.dest.clone(),
                    operation: after.clone(),
                    message,
                    context:   attrs.to_persisted().ok(),
                });
            }
        }
        return Ok(candidate.dest.clone());
    }

    *attrs = snapshot;
    tracing::debug!(state = %from, trigger = %trigger, "no candidate committed, context rolled back");
    Err(DialogError::NoTransition { from, trigger: trigger.clone() })
}
