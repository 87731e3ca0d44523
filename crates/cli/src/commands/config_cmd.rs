//! `reelchat config`: show the effective configuration.

use reelchat_config::AppConfig;

const REDACTED: &str = "[REDACTED]";

/// The configuration as TOML with every API key masked.
fn redacted_toml(config: &AppConfig) -> Result<String, toml::ser::Error> {
    let mut config = config.clone();
    if config.api_key.is_some() {
        config.api_key = Some(REDACTED.into());
    }
    for provider in config.providers.values_mut() {
        if provider.api_key.is_some() {
            provider.api_key = Some(REDACTED.into());
        }
    }
    toml::to_string_pretty(&config)
}

pub async fn run(default: bool) -> Result<(), Box<dyn std::error::Error>> {
    if default {
        println!("{}", AppConfig::default_toml());
        return Ok(());
    }

    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    println!("# {}", AppConfig::config_dir().join("config.toml").display());
    println!("{}", redacted_toml(&config)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelchat_config::ProviderConfig;

    #[test]
    fn keys_are_masked() {
        let mut config = AppConfig {
            api_key: Some("sk-secret".into()),
            ..AppConfig::default()
        };
        config.providers.insert(
            "upstage".into(),
            ProviderConfig {
                api_key: Some("up-secret".into()),
                ..ProviderConfig::default()
            },
        );

        let text = redacted_toml(&config).unwrap();
        assert!(!text.contains("sk-secret"));
        assert!(!text.contains("up-secret"));
        assert!(text.contains(REDACTED));
    }

    #[test]
    fn redacted_output_still_parses() {
        let text = redacted_toml(&AppConfig::default()).unwrap();
        assert!(AppConfig::from_toml(&text).is_ok());
    }
}
