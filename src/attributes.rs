//! Conversational context carried across the turns of one session.
//!
//! `SessionAttributes<D>` is the generic part (trigger, captured slots,
//! current state) plus a domain struct `D` holding skill-specific fields.
//! Domain fields that must never leave the process (large cached lookups and
//! the like) are marked `#[serde(skip)]` on the domain struct; everything else
//! is part of the persisted projection handed back to the caller.

use std::collections::BTreeMap;
use std::fmt::Debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::error::DialogError;
use crate::profile::Profile;
use crate::triggers::Trigger;
use crate::types::State;

/// Values captured from one utterance, keyed by slot name. `None` means the
/// slot was recognised but carried no value.
pub type Captured = BTreeMap<String, Option<String>>;

/// Skill-specific context fields.
///
/// Implementors should carry `#[serde(default)]` so that a partially persisted
/// context deserialises with declared defaults.
pub trait Domain:
    Clone + Default + PartialEq + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Slot names this skill captures. Names are lower-case.
    const SLOTS: &'static [&'static str] = &[];

    /// Called once when a context is freshly initialised for a known user.
    /// `None` means the user had no stored profile (first contact).
    fn apply_profile(&mut self, _profile: Option<&Profile>) {}

    /// Called at the start of every turn, before captured values are merged.
    /// Drop per-turn caches here.
    fn begin_turn(&mut self, _trigger: &Trigger) {}
}

/// Captured values accumulated over a conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slots(BTreeMap<String, Option<String>>);

impl Slots {
    /// All declared slots, none of them filled.
    pub fn declared(names: &[&str]) -> Self {
        Self(names.iter().map(|n| (n.to_string(), None)).collect())
    }

    /// Normalises one utterance's captured values: names are lower-cased,
    /// undeclared names dropped, empty strings treated as absent.
    pub fn from_captured(names: &[&str], captured: &Captured) -> Self {
        let mut slots = Self::declared(names);
        for (name, value) in captured {
            let key = name.to_lowercase();
            if let Some(entry) = slots.0.get_mut(&key) {
                *entry = value.clone().filter(|v| !v.is_empty());
            }
        }
        slots
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(|v| v.as_deref())
    }

    pub fn set(&mut self, name: impl Into<String>, value: Option<String>) {
        self.0.insert(name.into(), value);
    }

    /// Keeps the declared names, filling any that are missing.
    pub fn only(&self, names: &[&str]) -> Self {
        let mut slots = Self::declared(names);
        for (name, entry) in slots.0.iter_mut() {
            if let Some(value) = self.0.get(name) {
                *entry = value.clone();
            }
        }
        slots
    }

    /// Present values in `fresh` override ours; absent ones keep the prior value.
    pub fn merge(&mut self, fresh: &Slots) {
        for (name, value) in &fresh.0 {
            match value {
                Some(v) => { self.0.insert(name.clone(), Some(v.clone())); }
                None    => { self.0.entry(name.clone()).or_insert(None); }
            }
        }
    }

    /// Iterates over filled slots only.
    pub fn present(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().filter_map(|(k, v)| v.as_deref().map(|v| (k.as_str(), v)))
    }

    pub fn has_values(&self) -> bool {
        self.present().next().is_some()
    }

    fn pruned(&self) -> BTreeMap<&str, &str> {
        self.present().collect()
    }
}

/// The mutable record of one conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionAttributes<D> {
    /// Trigger of the turn being processed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<Trigger>,
    #[serde(default)]
    pub slots:   Slots,
    #[serde(default)]
    pub state:   State,
    #[serde(flatten)]
    pub fields:  D,
}

impl<D: Domain> Default for SessionAttributes<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Domain> SessionAttributes<D> {
    /// A fresh context: declared defaults, initial state, no trigger.
    pub fn new() -> Self {
        Self {
            trigger: None,
            slots:   Slots::declared(D::SLOTS),
            state:   State::initial(),
            fields:  D::default(),
        }
    }

    pub fn with_state(mut self, state: impl Into<State>) -> Self {
        self.state = state.into();
        self
    }

    /// Shortcut for reading a captured value.
    pub fn slot(&self, name: &str) -> Option<&str> {
        self.slots.get(name)
    }

    /// Applies one turn's inputs: merges captured values and records the trigger.
    pub fn begin_turn(&mut self, trigger: Trigger, captured: &Captured) {
        self.fields.begin_turn(&trigger);
        let fresh = Slots::from_captured(D::SLOTS, captured);
        self.slots.merge(&fresh);
        self.trigger = Some(trigger);
    }

    /// The transmitted projection of this context: non-transmitted domain
    /// fields are absent, null values and empty slots are pruned.
    pub fn to_persisted(&self) -> Result<Value, DialogError> {
        let mut value = serde_json::to_value(self)
            .map_err(|e| DialogError::InvalidContext(e.to_string()))?;
        let Value::Object(map) = &mut value else {
            return Err(DialogError::InvalidContext("attributes did not serialize to an object".into()));
        };

        map.retain(|_, v| !v.is_null());
        let slots = self.slots.pruned();
        if slots.is_empty() {
            map.remove("slots");
        } else {
            let slots = serde_json::to_value(slots)
                .map_err(|e| DialogError::InvalidContext(e.to_string()))?;
            map.insert("slots".to_string(), slots);
        }
        Ok(value)
    }

    /// Rebuilds a context from a previously persisted projection.
    /// Non-transmitted fields come back at their defaults.
    pub fn from_persisted(value: &Value) -> Result<Self, DialogError> {
        if !value.is_object() {
            return Err(DialogError::InvalidContext(format!("expected an object, got {value}")));
        }
        let mut attrs: Self = serde_json::from_value(value.clone())
            .map_err(|e| DialogError::InvalidContext(e.to_string()))?;

        attrs.slots = attrs.slots.only(D::SLOTS);
        Ok(attrs)
    }

    /// Adopts attributes echoed back by the caller.
    ///
    /// When they match our own transmitted projection the current value is
    /// kept, so non-transmitted caches survive. Otherwise the caller's copy
    /// wins. Returns true when the context was replaced.
    pub fn restore(&mut self, persisted: &Value) -> Result<bool, DialogError> {
        let incoming = Self::from_persisted(persisted)?;
        if incoming.to_persisted()? == self.to_persisted()? {
            return Ok(false);
        }
        *self = incoming;
        Ok(true)
    }
}
