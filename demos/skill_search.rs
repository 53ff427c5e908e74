//! # Skill Search Example
//!
//! Runs the catalog skill-search dialogue against an in-memory catalog.
//! Without arguments it plays a scripted conversation; with `--stdin` it
//! reads one JSON event envelope per line and prints one JSON response per
//! line.
//!
//! # Usage
//! ```bash
//! cargo run --example skill_search
//! RUST_LOG=dialogsm=debug cargo run --example skill_search
//! echo '{"type":"turn","session_id":"s1","trigger":"Search","captured":{"query":"pizza"}}' \
//!     | cargo run --example skill_search -- --stdin
//! ```

use std::sync::Arc;
use dialogsm::skillsearch::{build_search_machine, CatalogItem, SearchFields, SearchResults};
use dialogsm::{DialogService, EventEnvelope, MemoryProfileStore, MockLookup, SkillConfig, TracingTelemetry};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

fn catalog() -> MockLookup<SearchResults> {
    MockLookup::new()
        .with_result("pizza", SearchResults::new("pizza", vec![
            CatalogItem::new("sk-101", "Pizza Finder", "Food & Drink").by("Slices Inc")
                .described("Finds the closest open pizzeria and reads you its menu.")
                .rated(4.4, 212),
            CatalogItem::new("sk-102", "Pizza Facts", "Education")
                .described("A new fact about pizza every day."),
            CatalogItem::new("sk-103", "Dough Timer", "Food & Drink").by("Bakers Guild")
                .described("Tells you when your dough has risen.")
                .rated(3.8, 17),
        ]).with_total(41))
        .with_result("meditation", SearchResults::new("meditation", vec![
            CatalogItem::new("sk-201", "Calm Minute", "Health & Fitness").by("Quiet Labs")
                .described("One minute guided breathing.")
                .rated(4.8, 1030),
        ]))
        .with_fallback(SearchResults::empty(""))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = SkillConfig::from_env().default_prompt("What skill do you want to find?");
    let machine = build_search_machine(&config, Arc::new(catalog()))?;
    let service: DialogService<SearchFields> = DialogService::new(Arc::new(machine), config)?
        .with_profiles(Arc::new(MemoryProfileStore::new()))
        .with_telemetry(Arc::new(TracingTelemetry));

    if std::env::args().any(|a| a == "--stdin") {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let envelope: EventEnvelope = serde_json::from_str(&line)?;
            let reply = match service.handle(envelope).await {
                Ok(response) => serde_json::to_string(&response)?,
                Err(e)       => serde_json::json!({ "error": e.to_string() }).to_string(),
            };
            println!("{}", reply);
        }
        return Ok(());
    }

    println!("=== dialogsm-rs Skill Search Example ===\n");

    let script = [
        EventEnvelope::session_start("demo").user("listener-1"),
        EventEnvelope::turn("demo", "Search").captured("Query", Some("pizza")),
        EventEnvelope::turn("demo", "Next"),
        EventEnvelope::turn("demo", "Yes"),
        EventEnvelope::turn("demo", "Stop"),
        EventEnvelope::turn("demo", "No"),
        EventEnvelope::turn("demo", "Search").captured("Query", Some("underwater basket weaving")),
        EventEnvelope::turn("demo", "Search").captured("Query", Some("meditation")),
        EventEnvelope::turn("demo", "Next"),
        EventEnvelope::turn("demo", "Cancel"),
        EventEnvelope::session_end("demo"),
    ];

    for envelope in script {
        let label = envelope.trigger.as_ref()
            .map(|t| t.to_string())
            .unwrap_or_else(|| envelope.kind.clone());
        let response = service.handle(envelope).await?;
        println!("> {}", label);
        println!("  {}", response.speech);
        if let Some(title) = &response.card_title {
            println!("  [card] {}", title);
        }
        if response.should_end {
            println!("  (session ended)");
        }
    }

    Ok(())
}
