use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::attributes::Captured;
use crate::error::DialogError;
use crate::triggers::Trigger;

/// What an inbound event asks the engine to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    SessionStart,
    Turn,
    SessionEnd,
}

impl EventKind {
    pub fn parse(s: &str) -> Result<Self, DialogError> {
        match s {
            "session-start" => Ok(Self::SessionStart),
            "turn"          => Ok(Self::Turn),
            "session-end"   => Ok(Self::SessionEnd),
            other           => Err(DialogError::UnknownEventType(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SessionStart => "session-start",
            Self::Turn         => "turn",
            Self::SessionEnd   => "session-end",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An inbound conversational event, already stripped of channel specifics.
///
/// `kind` stays a plain string on the wire so that an unrecognised type
/// surfaces as `UnknownEventType` rather than a deserialisation error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    #[serde(rename = "type")]
    pub kind:       String,
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id:    Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger:    Option<Trigger>,
    #[serde(default, skip_serializing_if = "Captured::is_empty")]
    pub captured:   Captured,
    /// Attributes persisted from the previous response, echoed back.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Value>,
    /// Timestamps, channel ids and the like; passed through untouched.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub metadata:   Value,
}

impl EventEnvelope {
    fn with_kind(kind: EventKind, session_id: impl Into<String>) -> Self {
        Self {
            kind:       kind.as_str().to_string(),
            session_id: session_id.into(),
            user_id:    None,
            trigger:    None,
            captured:   Captured::new(),
            attributes: None,
            metadata:   Value::Null,
        }
    }

    pub fn session_start(session_id: impl Into<String>) -> Self {
        Self::with_kind(EventKind::SessionStart, session_id)
    }

    pub fn turn(session_id: impl Into<String>, trigger: impl Into<Trigger>) -> Self {
        let mut envelope = Self::with_kind(EventKind::Turn, session_id);
        envelope.trigger = Some(trigger.into());
        envelope
    }

    pub fn session_end(session_id: impl Into<String>) -> Self {
        Self::with_kind(EventKind::SessionEnd, session_id)
    }

    pub fn captured(mut self, name: impl Into<String>, value: Option<&str>) -> Self {
        self.captured.insert(name.into(), value.map(str::to_string)); self
    }

    pub fn user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into()); self
    }

    pub fn attributes(mut self, attributes: Value) -> Self {
        self.attributes = Some(attributes); self
    }

    pub fn metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata; self
    }

    pub fn kind(&self) -> Result<EventKind, DialogError> {
        EventKind::parse(&self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_wire_shape() {
        let envelope: EventEnvelope = serde_json::from_value(json!({
            "type": "turn",
            "session_id": "s-1",
            "trigger": "Search",
            "captured": { "Query": "pizza", "Category": null },
            "metadata": { "request_id": "r-9" }
        })).unwrap();

        assert_eq!(envelope.kind().unwrap(), EventKind::Turn);
        assert_eq!(envelope.trigger, Some(Trigger::search()));
        assert_eq!(envelope.captured.get("Query"), Some(&Some("pizza".to_string())));
        assert_eq!(envelope.captured.get("Category"), Some(&None));
        assert_eq!(envelope.metadata["request_id"], "r-9");
    }

    #[test]
    fn unknown_type_is_reported_by_name() {
        let envelope: EventEnvelope = serde_json::from_value(json!({
            "type": "display-element-selected",
            "session_id": "s-1"
        })).unwrap();

        match envelope.kind() {
            Err(DialogError::UnknownEventType(t)) => assert_eq!(t, "display-element-selected"),
            other => panic!("expected UnknownEventType, got {:?}", other),
        }
    }
}
