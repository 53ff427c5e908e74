use serde::{Deserialize, Serialize};
use crate::config::SkillConfig;

/// The reply produced for one inbound event.
///
/// Channel adapters turn this into their own wire format; the engine never
/// does. `context` carries the transmitted projection of the session
/// attributes, which the caller persists and echoes back on the next turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub speech:     String,
    pub reprompt:   String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_body:  Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url:  Option<String>,
    #[serde(default)]
    pub should_end: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context:    Option<serde_json::Value>,
}

impl Response {
    pub fn new(speech: impl Into<String>, reprompt: impl Into<String>) -> Self {
        Self {
            speech:     speech.into(),
            reprompt:   reprompt.into(),
            card_title: None,
            card_body:  None,
            image_url:  None,
            should_end: false,
            context:    None,
        }
    }

    /// Attach a visual card. The card body defaults to the trimmed speech
    /// until `card_body` is called.
    pub fn card(mut self, title: impl Into<String>) -> Self {
        if self.card_body.is_none() {
            self.card_body = Some(self.speech.trim().to_string());
        }
        self.card_title = Some(title.into());
        self
    }

    pub fn card_body(mut self, body: impl AsRef<str>) -> Self {
        self.card_body = Some(body.as_ref().trim().to_string());
        self
    }

    pub fn image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    pub fn end_session(mut self) -> Self {
        self.should_end = true;
        self
    }

    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = Some(context);
        self
    }

    // ── Canned responses ────────────────────────────────────────────────

    pub fn welcome(config: &SkillConfig) -> Self {
        Self::new(
            format!("Welcome to {}, {}", config.skill_name, config.default_prompt),
            config.default_prompt.clone(),
        )
    }

    pub fn farewell(config: &SkillConfig) -> Self {
        Self::new(format!("Thank you for using {}", config.skill_name), "")
            .end_session()
    }

    pub fn not_understood(config: &SkillConfig) -> Self {
        Self::new(
            config.not_understood_speech.clone(),
            config.not_understood_reprompt.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_body_defaults_to_trimmed_speech() {
        let resp = Response::new("  Top result is pizza.  ", "More?").card("Search");
        assert_eq!(resp.card_title.as_deref(), Some("Search"));
        assert_eq!(resp.card_body.as_deref(), Some("Top result is pizza."));
    }

    #[test]
    fn explicit_card_body_wins() {
        let resp = Response::new("speech", "reprompt")
            .card_body("\n    Creator: AI2\n")
            .card("Title");
        assert_eq!(resp.card_body.as_deref(), Some("Creator: AI2"));
    }

    #[test]
    fn farewell_ends_session() {
        let config = SkillConfig::default();
        let resp = Response::farewell(&config);
        assert!(resp.should_end);
        assert_eq!(resp.speech, "Thank you for using Allen A.I.");
    }

    #[test]
    fn serialization_omits_empty_optionals() {
        let js = serde_json::to_value(Response::new("hi", "hello")).unwrap();
        assert_eq!(js, serde_json::json!({ "speech": "hi", "reprompt": "hello", "should_end": false }));
    }
}
