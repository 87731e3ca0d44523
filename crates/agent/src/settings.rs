//! Tunables shared by the handlers of one dialogue graph.

use reelchat_config::{AppConfig, RoutingConfig};

#[derive(Debug, Clone)]
pub struct DialogueSettings {
    /// Model name passed with every provider request.
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    /// History entries shown to the entry handler.
    pub chat_window: usize,
    /// History entries shown to the specialists.
    pub delegate_window: usize,
    /// Passages requested per review query.
    pub top_k: usize,
    pub routing: RoutingConfig,
}

impl Default for DialogueSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".into(),
            temperature: 0.7,
            max_tokens: None,
            chat_window: 10,
            delegate_window: 6,
            top_k: 4,
            routing: RoutingConfig::default(),
        }
    }
}

impl DialogueSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            model: reelchat_providers::model_for(config),
            temperature: config.default_temperature,
            max_tokens: Some(config.default_max_tokens),
            chat_window: config.history.chat_window,
            delegate_window: config.history.delegate_window,
            top_k: config.retrieval.top_k,
            routing: config.routing.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_configured_defaults() {
        let from_config = DialogueSettings::from_config(&AppConfig::default());
        let defaults = DialogueSettings::default();
        assert_eq!(from_config.model, defaults.model);
        assert_eq!(from_config.chat_window, 10);
        assert_eq!(from_config.delegate_window, 6);
        assert_eq!(from_config.top_k, 4);
        assert_eq!(from_config.max_tokens, Some(1024));
    }

    #[test]
    fn windows_follow_config() {
        let config = AppConfig::from_toml(
            r#"
            default_model = "solar-pro"

            [history]
            chat_window = 4
            delegate_window = 2
            "#,
        )
        .unwrap();
        let settings = DialogueSettings::from_config(&config);
        assert_eq!(settings.model, "solar-pro");
        assert_eq!(settings.chat_window, 4);
        assert_eq!(settings.delegate_window, 2);
    }
}
