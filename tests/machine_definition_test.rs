use dialogsm::{
    DefinitionError, DialogState, Domain, FnState, MachineBuilder, OperationKind, Response,
    SessionAttributes, SkillConfig, State, TransitionDecl, Trigger,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Plain {}

impl Domain for Plain {}

fn builder() -> MachineBuilder<Plain> {
    MachineBuilder::<Plain>::new()
        .guard("ready", |_| true)
        .effect("noop", |_| Ok(()))
}

/// A hand-written state, the way skills usually declare them.
struct Goodbye;

impl DialogState<Plain> for Goodbye {
    fn name(&self) -> &str { "goodbye" }

    fn respond(&self, _attrs: &SessionAttributes<Plain>) -> Response {
        Response::new("Bye", "").end_session()
    }

    fn transitions(&self) -> Vec<TransitionDecl> {
        vec![TransitionDecl::on(Trigger::stop()).from_any()]
    }

    fn is_terminal(&self) -> bool { true }
}

#[test]
fn test_initial_state_is_added_with_welcome() {
    let config = SkillConfig::default().skill_name("Trivia").default_prompt("Ready?");
    let machine = builder()
        .config(config)
        .state(FnState::speaking("asking", "Question one")
            .transition(TransitionDecl::on("Play").from("initial")))
        .build()
        .unwrap();

    assert_eq!(machine.state_names(), vec![State::new("asking"), State::new("initial")]);
    let welcome = machine.respond(&SessionAttributes::new()).unwrap();
    assert_eq!(welcome.speech, "Welcome to Trivia, Ready?");
    assert!(!welcome.should_end);
}

#[test]
fn test_inbound_and_outbound_declarations() {
    let machine = builder()
        .state(FnState::speaking("asking", "Question")
            .transition(TransitionDecl::on("Play").from("initial"))
            .transition(TransitionDecl::on("Quit").to("goodbye")))
        .state(Goodbye)
        .build()
        .unwrap();

    let play = machine.table().candidates(&Trigger::new("Play"));
    assert_eq!(play.len(), 1);
    assert_eq!(play[0].dest, State::new("asking"));

    let quit = machine.table().candidates(&Trigger::new("Quit"));
    assert!(quit[0].source.includes(&State::new("asking")));
    assert_eq!(quit[0].dest, State::new("goodbye"));
    assert!(machine.is_terminal(&State::new("goodbye")));
}

#[test]
fn test_source_list_expands_per_state() {
    let machine = builder()
        .state(FnState::speaking("a", "A").transition(TransitionDecl::on("Go").from("initial")))
        .state(FnState::speaking("b", "B")
            .transition(TransitionDecl::on("Back").from_each(["a", "initial"])))
        .build()
        .unwrap();
    assert_eq!(machine.table().candidates(&Trigger::new("Back")).len(), 2);
}

#[test]
fn test_unknown_destination_is_rejected() {
    let err = builder()
        .transition(TransitionDecl::on("Go").from("initial").to("nowhere"))
        .build()
        .err()
        .unwrap();
    assert_eq!(err, DefinitionError::UnknownDestination {
        trigger: Trigger::new("Go"),
        dest:    State::new("nowhere"),
    });
}

#[test]
fn test_unknown_source_is_rejected() {
    let err = builder()
        .state(FnState::speaking("a", "A").transition(TransitionDecl::on("Go").from("limbo")))
        .build()
        .err()
        .unwrap();
    assert!(matches!(err, DefinitionError::UnknownSource { ref source_state, .. } if source_state.as_str() == "limbo"));
}

#[test]
fn test_unregistered_operations_are_rejected() {
    let cases = [
        (TransitionDecl::on("Go").from("initial").guard("missing"),   OperationKind::Guard),
        (TransitionDecl::on("Go").from("initial").prepare("missing"), OperationKind::Prepare),
        (TransitionDecl::on("Go").from("initial").after("missing"),   OperationKind::After),
    ];
    for (decl, expected) in cases {
        let err = builder()
            .state(FnState::speaking("a", "A").transition(decl))
            .build()
            .err()
            .unwrap();
        match err {
            DefinitionError::UnknownOperation { kind, name, .. } => {
                assert_eq!(kind, expected);
                assert_eq!(name, "missing");
            }
            other => panic!("expected UnknownOperation, got {:?}", other),
        }
    }
}

#[test]
fn test_registered_operations_are_accepted() {
    let machine = builder()
        .state(FnState::speaking("a", "A")
            .transition(TransitionDecl::on("Go").from("initial").guard("ready").prepare("noop").after("noop")))
        .build();
    assert!(machine.is_ok());
}

#[test]
fn test_duplicate_state_is_rejected() {
    let err = builder()
        .state(FnState::speaking("a", "A"))
        .state(FnState::speaking("a", "again"))
        .build()
        .err()
        .unwrap();
    assert_eq!(err, DefinitionError::DuplicateState(State::new("a")));
}

#[test]
fn test_custom_initial_must_be_declared() {
    let err = builder().initial("lobby").build().err().unwrap();
    assert_eq!(err, DefinitionError::UnknownInitial(State::new("lobby")));

    let machine = builder().initial("lobby").state(FnState::speaking("lobby", "Hi")).build().unwrap();
    assert_eq!(machine.initial(), &State::new("lobby"));
    assert_eq!(machine.state_names().len(), 1);
}

#[test]
fn test_unguarded_duplicates_are_ambiguous() {
    let err = builder()
        .state(FnState::speaking("a", "A").transition(TransitionDecl::on("Go").from("initial")))
        .state(FnState::speaking("b", "B").transition(TransitionDecl::on("Go").from("initial")))
        .build()
        .err()
        .unwrap();
    assert!(matches!(err, DefinitionError::AmbiguousTransition { .. }));

    let guarded = builder()
        .state(FnState::speaking("a", "A").transition(TransitionDecl::on("Go").from("initial").guard("ready")))
        .state(FnState::speaking("b", "B").transition(TransitionDecl::on("Go").from("initial")))
        .build();
    assert!(guarded.is_ok());
}

#[test]
fn test_incomplete_free_standing_transition() {
    let err = builder().transition(TransitionDecl::on("Go").to("initial")).build().err().unwrap();
    assert_eq!(err, DefinitionError::IncompleteTransition { trigger: Trigger::new("Go") });
}

#[test]
fn test_describe_and_dot_output() {
    let machine = builder()
        .state(FnState::speaking("asking", "Question")
            .transition(TransitionDecl::on("Play").from("initial").guard("ready")))
        .state(Goodbye)
        .build()
        .unwrap();

    let text = machine.describe();
    assert!(text.contains("Trigger: Play"));
    assert!(text.contains("initial -> asking, guards: [ready]"));
    assert!(text.contains("* -> goodbye"));

    let dot = machine.to_dot();
    assert!(dot.starts_with("digraph dialogue {"));
    assert!(dot.contains("\"initial\" -> \"asking\" [label=\"Play [ready]\"];"));
    assert!(dot.contains("\"goodbye\" [shape=box];"));
}
