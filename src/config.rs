use serde::{Deserialize, Serialize};

/// Process-wide settings for one skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillConfig {
    /// Name spoken in the welcome and farewell responses
    pub skill_name: String,

    /// Prompt offered on launch and whenever the user is asked what to do next
    pub default_prompt: String,

    /// Maximum number of live sessions kept in the pool
    pub pool_capacity: usize,

    /// Maximum number of trace entries kept per session (0 = keep none)
    pub trace_limit: usize,

    /// Fallback used when no transition matches
    pub not_understood_speech: String,
    pub not_understood_reprompt: String,
}

impl Default for SkillConfig {
    fn default() -> Self {
        Self {
            skill_name:              "Allen A.I.".to_string(),
            default_prompt:          "How can I help?".to_string(),
            pool_capacity:           32,
            trace_limit:             64,
            not_understood_speech:   "I did not understand your response, please say it differently.".to_string(),
            not_understood_reprompt: "Please respond in a different way.".to_string(),
        }
    }
}

impl SkillConfig {
    /// Parse a JSON document; missing keys take their defaults.
    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Defaults overlaid with `DIALOGSM_*` environment variables.
    ///
    /// * `DIALOGSM_SKILL_NAME`
    /// * `DIALOGSM_DEFAULT_PROMPT`
    /// * `DIALOGSM_POOL_CAPACITY`
    pub fn from_env() -> Self {
        Self::default().overlay(|key| std::env::var(key).ok())
    }

    fn overlay(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(name) = lookup("DIALOGSM_SKILL_NAME") {
            self.skill_name = name;
        }
        if let Some(prompt) = lookup("DIALOGSM_DEFAULT_PROMPT") {
            self.default_prompt = prompt;
        }
        if let Some(capacity) = lookup("DIALOGSM_POOL_CAPACITY") {
            match capacity.parse() {
                Ok(n)  => self.pool_capacity = n,
                Err(_) => tracing::warn!(value = %capacity, "ignoring non-numeric DIALOGSM_POOL_CAPACITY"),
            }
        }
        self
    }

    pub fn skill_name(mut self, name: impl Into<String>) -> Self {
        self.skill_name = name.into(); self
    }

    pub fn default_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.default_prompt = prompt.into(); self
    }

    pub fn pool_capacity(mut self, n: usize) -> Self {
        self.pool_capacity = n; self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = SkillConfig::from_json_str(r#"{ "skill_name": "Skill Finder" }"#).unwrap();
        assert_eq!(config.skill_name, "Skill Finder");
        assert_eq!(config.pool_capacity, 32);
    }

    #[test]
    fn overlay_reads_known_keys() {
        let env: HashMap<&str, &str> = [
            ("DIALOGSM_SKILL_NAME", "Finder"),
            ("DIALOGSM_POOL_CAPACITY", "4"),
        ].into();
        let config = SkillConfig::default().overlay(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.skill_name, "Finder");
        assert_eq!(config.pool_capacity, 4);
        assert_eq!(config.default_prompt, "How can I help?");
    }

    #[test]
    fn overlay_ignores_bad_capacity() {
        let config = SkillConfig::default()
            .overlay(|k| (k == "DIALOGSM_POOL_CAPACITY").then(|| "lots".to_string()));
        assert_eq!(config.pool_capacity, 32);
    }
}
