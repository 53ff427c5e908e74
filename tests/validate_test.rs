use std::sync::Arc;
use dialogsm::skillsearch::{build_search_machine, SearchResults};
use dialogsm::{
    validate, Domain, FnState, MachineBuilder, MockLookup, SkillConfig, State, TransitionDecl,
    Trigger, TriggerCatalog, Violation,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Plain {}

impl Domain for Plain {}

const SEARCH_SCHEMA: &str = r#"{
    "intents": [
        { "intent": "Search", "slots": [{ "name": "Query", "type": "SEARCH_QUERY" }] },
        { "intent": "Next" },
        { "intent": "Yes" },
        { "intent": "No" },
        { "intent": "Cancel" },
        { "intent": "Stop" },
        { "intent": "Help" }
    ]
}"#;

#[test]
fn test_search_skill_is_consistent() {
    let lookup = Arc::new(MockLookup::new().with_fallback(SearchResults::empty("")));
    let machine = build_search_machine(&SkillConfig::default(), lookup).unwrap();
    let catalog = TriggerCatalog::from_intent_schema(SEARCH_SCHEMA).unwrap().ignoring(["Help"]);

    assert_eq!(validate(&machine, &catalog), Vec::<Violation>::new());
}

#[test]
fn test_unhandled_catalog_trigger_is_reported() {
    let lookup = Arc::new(MockLookup::new().with_fallback(SearchResults::empty("")));
    let machine = build_search_machine(&SkillConfig::default(), lookup).unwrap();
    let catalog = TriggerCatalog::from_intent_schema(SEARCH_SCHEMA).unwrap();

    assert_eq!(validate(&machine, &catalog), vec![Violation::UnhandledTrigger(Trigger::help())]);
}

#[test]
fn test_connectivity_and_unknown_triggers() {
    let machine = MachineBuilder::<Plain>::new()
        .state(FnState::speaking("asking", "Question?")
            .transition(TransitionDecl::on("Play").from("initial")))
        .state(FnState::speaking("orphan", "Nobody comes here")
            .transition(TransitionDecl::on("Leave").to("initial")))
        .state(FnState::speaking("done", "Bye").terminal()
            .transition(TransitionDecl::on("Quit").from("asking")))
        .build()
        .unwrap();
    let catalog = TriggerCatalog::new(["Play", "Quit", "Help"]);

    let violations = validate(&machine, &catalog);
    assert_eq!(violations, vec![
        Violation::UnknownTrigger(Trigger::new("Leave")),
        Violation::UnhandledTrigger(Trigger::help()),
        Violation::NoInbound(State::new("orphan")),
    ]);
    assert_eq!(violations[2].to_string(), "state orphan has no inbound transitions");
}

#[test]
fn test_dead_end_state_is_reported() {
    let machine = MachineBuilder::<Plain>::new()
        .state(FnState::speaking("stuck", "Hmm")
            .transition(TransitionDecl::on("Go").from("initial")))
        .build()
        .unwrap();
    let catalog = TriggerCatalog::new(["Go"]);

    assert_eq!(validate(&machine, &catalog), vec![Violation::NoOutbound(State::new("stuck"))]);
}

#[test]
fn test_malformed_schema_is_an_error() {
    assert!(TriggerCatalog::from_intent_schema(r#"{"intent": "Search"}"#).is_err());
}
