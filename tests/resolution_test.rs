use dialogsm::{
    resolve, Captured, CompiledMachine, DialogError, Domain, FnState, MachineBuilder,
    SessionAttributes, State, TransitionDecl, Trigger,
};
use proptest::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct Ledger {
    attempts: u32,
    note:     Option<String>,
    flag:     bool,
}

impl Domain for Ledger {
    const SLOTS: &'static [&'static str] = &["item"];
}

fn machine() -> CompiledMachine<Ledger> {
    MachineBuilder::<Ledger>::new()
        .state(FnState::speaking("b", "at b"))
        .state(FnState::speaking("c", "at c"))
        .state(FnState::speaking("d", "at d"))
        .guard("always", |_| true)
        .guard("never", |_| false)
        .guard("flagged", |a| a.fields.flag)
        .effect("bump", |a| { a.fields.attempts += 1; Ok(()) })
        .effect("explode", |a| {
            a.fields.note = Some("half done".into());
            Err("backend unavailable".into())
        })
        // first match wins when both guards hold
        .transition(TransitionDecl::on("Go").from("initial").to("b").guard("always"))
        .transition(TransitionDecl::on("Go").from("initial").to("c").guard("always"))
        // a rejected candidate's prepare mutation is visible to the next one
        .transition(TransitionDecl::on("Pick").from("initial").to("b").prepare("bump").guard("never"))
        .transition(TransitionDecl::on("Pick").from("initial").to("c").prepare("bump").guard("always"))
        .transition(TransitionDecl::on("Fail").from("initial").to("b").prepare("bump").guard("never"))
        .transition(TransitionDecl::on("Boom").from("initial").to("b").prepare("explode"))
        .transition(TransitionDecl::on("Late").from("initial").to("d").after("explode"))
        .transition(TransitionDecl::on("Flag").from("initial").to("d").guard("flagged"))
        .transition(TransitionDecl::on("Reset").from_any().to("initial"))
        .build()
        .expect("valid machine")
}

fn start() -> SessionAttributes<Ledger> {
    let mut attrs = SessionAttributes::<Ledger>::new();
    attrs.slots.set("item", Some("coffee".into()));
    attrs.fields.attempts = 3;
    attrs
}

#[test]
fn test_first_declared_candidate_wins() {
    let m = machine();
    let mut attrs = start();
    let dest = resolve(&m, &mut attrs, &Trigger::new("Go")).unwrap();
    assert_eq!(dest, State::new("b"));
    assert_eq!(attrs.state, State::new("b"));
}

#[test]
fn test_prepare_mutation_survives_rejected_candidate() {
    let m = machine();
    let mut attrs = start();
    let dest = resolve(&m, &mut attrs, &Trigger::new("Pick")).unwrap();
    assert_eq!(dest, State::new("c"));
    assert_eq!(attrs.fields.attempts, 5);
}

#[test]
fn test_no_eligible_candidate_restores_context() {
    let m = machine();
    let mut attrs = start();
    let before = attrs.clone();

    let err = resolve(&m, &mut attrs, &Trigger::new("Fail")).unwrap_err();
    assert!(matches!(err, DialogError::NoTransition { .. }));
    assert_eq!(attrs, before);
}

#[test]
fn test_unknown_trigger_is_no_transition() {
    let m = machine();
    let mut attrs = start();
    let before = attrs.clone();

    match resolve(&m, &mut attrs, &Trigger::new("Dance")) {
        Err(DialogError::NoTransition { from, trigger }) => {
            assert!(from.is_initial());
            assert_eq!(trigger, Trigger::new("Dance"));
        }
        other => panic!("expected NoTransition, got {:?}", other),
    }
    assert_eq!(attrs, before);
}

#[test]
fn test_source_mismatch_is_no_transition() {
    let m = machine();
    let mut attrs = start().with_state("b");
    let err = resolve(&m, &mut attrs, &Trigger::new("Go")).unwrap_err();
    assert!(err.is_recoverable());
    assert_eq!(attrs.state, State::new("b"));
}

#[test]
fn test_failed_prepare_rolls_back_partial_mutation() {
    let m = machine();
    let mut attrs = start();
    let before = attrs.clone();

    match resolve(&m, &mut attrs, &Trigger::new("Boom")) {
        Err(DialogError::SideEffect { operation, message, .. }) => {
            assert_eq!(operation, "explode");
            assert_eq!(message, "backend unavailable");
        }
        other => panic!("expected SideEffect, got {:?}", other),
    }
    assert_eq!(attrs, before);
    assert!(attrs.fields.note.is_none());
}

#[test]
fn test_failed_after_operation_keeps_new_state() {
    let m = machine();
    let mut attrs = start();

    let err = resolve(&m, &mut attrs, &Trigger::new("Late")).unwrap_err();
    assert!(matches!(err, DialogError::PostEffect { .. }));
    assert!(!err.is_recoverable());
    assert_eq!(attrs.state, State::new("d"));
    assert_eq!(attrs.fields.note.as_deref(), Some("half done"));

    let context = err.context().expect("committed context");
    assert_eq!(context["state"], "d");
    assert_eq!(context["note"], "half done");
}

#[test]
fn test_guard_reads_domain_fields() {
    let m = machine();
    let mut attrs = start();
    assert!(resolve(&m, &mut attrs, &Trigger::new("Flag")).is_err());

    attrs.fields.flag = true;
    assert_eq!(resolve(&m, &mut attrs, &Trigger::new("Flag")).unwrap(), State::new("d"));
}

#[test]
fn test_wildcard_source_matches_every_state() {
    let m = machine();
    for state in ["initial", "b", "c", "d"] {
        let mut attrs = start().with_state(state);
        assert!(resolve(&m, &mut attrs, &Trigger::new("Reset")).unwrap().is_initial());
    }
}

fn arb_attrs() -> impl Strategy<Value = SessionAttributes<Ledger>> {
    (
        prop::sample::select(vec!["initial", "b", "c", "d"]),
        any::<u32>(),
        proptest::option::of("[a-z]{1,8}"),
        any::<bool>(),
        proptest::option::of("[a-z]{1,8}"),
    ).prop_map(|(state, attempts, note, flag, item)| {
        let mut attrs = SessionAttributes::<Ledger>::new().with_state(state);
        attrs.fields = Ledger { attempts: attempts / 2, note, flag };
        attrs.slots.set("item", item);
        attrs
    })
}

proptest! {
    #[test]
    fn prop_failed_resolution_leaves_context_untouched(
        mut attrs in arb_attrs(),
        trigger in prop::sample::select(vec!["Fail", "Boom", "Dance", "Pick", "Go"]),
    ) {
        let m = machine();
        let before = attrs.clone();
        if let Err(e) = resolve(&m, &mut attrs, &Trigger::new(trigger)) {
            prop_assert!(e.is_recoverable());
            prop_assert_eq!(&attrs, &before);
        }
    }

    #[test]
    fn prop_absent_or_equal_captures_change_nothing(
        mut attrs in arb_attrs(),
        resend in any::<bool>(),
    ) {
        let before = attrs.clone();
        let mut captured = Captured::new();
        let echoed = if resend { attrs.slot("item").map(str::to_string) } else { None };
        captured.insert("Item".to_string(), echoed);

        attrs.begin_turn(Trigger::new("Go"), &captured);
        prop_assert_eq!(&attrs.slots, &before.slots);
        prop_assert_eq!(&attrs.fields, &before.fields);
        prop_assert_eq!(&attrs.state, &before.state);
    }
}
