pub mod types;
pub mod triggers;
pub mod attributes;
pub mod transitions;
pub mod operations;
pub mod states;
pub mod builder;
pub mod machine;
pub mod engine;
pub mod session;
pub mod pool;
pub mod response;
pub mod envelope;
pub mod adapter;
pub mod lookup;
pub mod profile;
pub mod telemetry;
pub mod validate;
pub mod config;
pub mod trace;
pub mod error;
pub mod skillsearch;

// Convenience re-exports at crate root
pub use adapter::DialogService;
pub use attributes::{Captured, Domain, SessionAttributes, Slots};
pub use builder::MachineBuilder;
pub use config::SkillConfig;
pub use engine::resolve;
pub use envelope::{EventEnvelope, EventKind};
pub use error::{DefinitionError, DialogError, OperationKind};
pub use lookup::{LookupOperation, MockLookup};
pub use machine::CompiledMachine;
pub use operations::{EffectFn, GuardFn, OperationRegistry};
pub use pool::{SessionPool, SharedSession};
pub use profile::{MemoryProfileStore, Profile, ProfileStore};
#[cfg(feature = "sqlite")]
pub use profile::SqliteProfileStore;
pub use response::Response;
pub use session::Session;
pub use states::{DialogState, FnState};
pub use telemetry::{Telemetry, TelemetryRecord, TracingTelemetry};
pub use trace::{Outcome, Trace, TraceEntry};
pub use transitions::{SourceRef, Transition, TransitionDecl, TransitionTable};
pub use triggers::Trigger;
pub use types::State;
pub use validate::{validate, TriggerCatalog, Violation};
