//! # Definition Check Example
//!
//! Compiles the skill-search machine, checks it against an intent schema, and
//! prints the machine as text or Graphviz.
//!
//! # Usage
//! ```bash
//! cargo run --example check_definition
//! cargo run --example check_definition -- path/to/intent_schema.json
//! cargo run --example check_definition -- --dot | dot -Tpng > machine.png
//! ```

use std::sync::Arc;
use dialogsm::skillsearch::{build_search_machine, SearchResults};
use dialogsm::{validate, MockLookup, SkillConfig, TriggerCatalog};

const DEFAULT_SCHEMA: &str = r#"{
    "intents": [
        { "intent": "Search" },
        { "intent": "Next" },
        { "intent": "Yes" },
        { "intent": "No" },
        { "intent": "Cancel" },
        { "intent": "Stop" },
        { "intent": "Help" }
    ]
}"#;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let dot = args.iter().any(|a| a == "--dot");
    let schema = match args.iter().find(|a| !a.starts_with("--")) {
        Some(path) => std::fs::read_to_string(path)?,
        None       => DEFAULT_SCHEMA.to_string(),
    };

    let lookup = Arc::new(MockLookup::new().with_fallback(SearchResults::empty("")));
    let machine = build_search_machine(&SkillConfig::from_env(), lookup)?;

    if dot {
        print!("{}", machine.to_dot());
        return Ok(());
    }

    println!("{}", machine.describe());

    // Help is answered by the platform, not by the machine.
    let catalog = TriggerCatalog::from_intent_schema(&schema)?.ignoring(["Help"]);
    let violations = validate(&machine, &catalog);
    if violations.is_empty() {
        println!("Definition is consistent with {} catalog triggers.", catalog.len());
        return Ok(());
    }

    for v in &violations {
        println!("  - {}", v);
    }
    anyhow::bail!("{} definition problem(s) found", violations.len())
}
