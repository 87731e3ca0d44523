//! Provider router: selects the correct LLM provider based on config.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use reelchat_core::provider::Provider;

use crate::openai_compat::OpenAiCompatProvider;
use crate::retry::RetryProvider;

/// Routes LLM requests to the correct provider.
pub struct ProviderRouter {
    providers: HashMap<String, Arc<dyn Provider>>,
    default_provider: String,
}

impl ProviderRouter {
    /// Create a new router with a default provider.
    pub fn new(default_provider: impl Into<String>) -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider.into(),
        }
    }

    /// Register a provider.
    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn Provider>) {
        self.providers.insert(name.into(), provider);
    }

    /// Get the default provider.
    pub fn default(&self) -> Option<Arc<dyn Provider>> {
        self.providers.get(&self.default_provider).cloned()
    }

    /// Get a specific provider by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(name).cloned()
    }
}

/// Build providers from configuration, each wrapped in the configured retry policy.
pub fn build_from_config(config: &reelchat_config::AppConfig) -> ProviderRouter {
    let mut router = ProviderRouter::new(&config.default_provider);
    let timeout = Duration::from_secs(config.retry.timeout_secs);

    let wrap = |inner: OpenAiCompatProvider| -> Arc<dyn Provider> {
        Arc::new(RetryProvider::new(
            Arc::new(inner),
            config.retry.max_attempts,
            timeout,
        ))
    };

    for (name, provider_config) in &config.providers {
        let api_key = provider_config
            .api_key
            .clone()
            .or_else(|| config.api_key.clone())
            .unwrap_or_default();

        let base_url = provider_config
            .api_url
            .clone()
            .unwrap_or_else(|| default_base_url(name));

        router.register(
            name.clone(),
            wrap(OpenAiCompatProvider::new(name, &base_url, &api_key)),
        );
    }

    // Ensure the default provider exists (even if not explicitly configured)
    if router.get(&config.default_provider).is_none() {
        let api_key = config.api_key.clone().unwrap_or_default();
        let base_url = default_base_url(&config.default_provider);
        router.register(
            config.default_provider.clone(),
            wrap(OpenAiCompatProvider::new(
                &config.default_provider,
                &base_url,
                &api_key,
            )),
        );
    }

    router
}

/// Resolve the model to use: a per-provider override wins over the global default.
pub fn model_for(config: &reelchat_config::AppConfig) -> String {
    config
        .providers
        .get(&config.default_provider)
        .and_then(|p| p.default_model.clone())
        .unwrap_or_else(|| config.default_model.clone())
}

/// Get the default base URL for well-known providers.
fn default_base_url(provider_name: &str) -> String {
    match provider_name {
        "openai" => "https://api.openai.com/v1".into(),
        "upstage" => "https://api.upstage.ai/v1/solar".into(),
        "openrouter" => "https://openrouter.ai/api/v1".into(),
        "ollama" => "http://localhost:11434/v1".into(),
        "vllm" => "http://localhost:8000/v1".into(),
        _ => format!("https://{provider_name}.api.example.com/v1"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelchat_config::{AppConfig, ProviderConfig};
    use reelchat_core::error::ProviderError;
    use reelchat_core::message::Message;
    use reelchat_core::provider::ProviderRequest;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn router_register_and_lookup() {
        let mut router = ProviderRouter::new("openai");
        router.register(
            "openai",
            Arc::new(OpenAiCompatProvider::new(
                "openai",
                "https://api.openai.com/v1",
                "sk-test",
            )),
        );

        assert!(router.get("openai").is_some());
        assert!(router.get("nonexistent").is_none());
        assert!(router.default().is_some());
    }

    #[test]
    fn default_base_urls() {
        assert!(default_base_url("openai").contains("api.openai.com"));
        assert!(default_base_url("upstage").contains("api.upstage.ai"));
        assert!(default_base_url("ollama").contains("localhost:11434"));
    }

    #[test]
    fn build_from_default_config() {
        let router = build_from_config(&AppConfig::default());
        let provider = router.default().unwrap();
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn configured_providers_are_registered() {
        let mut config = AppConfig {
            default_provider: "upstage".into(),
            ..AppConfig::default()
        };
        config.providers.insert(
            "upstage".into(),
            ProviderConfig {
                api_key: Some("up-key".into()),
                api_url: None,
                default_model: Some("solar-pro".into()),
            },
        );
        config
            .providers
            .insert("ollama".into(), ProviderConfig::default());

        let router = build_from_config(&config);
        assert!(router.get("upstage").is_some());
        assert!(router.get("ollama").is_some());
        assert!(router.get("openai").is_none());
        assert_eq!(model_for(&config), "solar-pro");
    }

    #[test]
    fn model_falls_back_to_global_default() {
        assert_eq!(model_for(&AppConfig::default()), "gpt-4o-mini");
    }

    /// Serves one chat completion after `delay`, then closes.
    async fn slow_endpoint(delay: Duration) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                if n == 0 || request_complete(&request) {
                    break;
                }
            }

            tokio::time::sleep(delay).await;

            let body = r#"{"model":"m","choices":[{"message":{"role":"assistant","content":"늦었지만 답장"}}]}"#;
            let response = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
        });

        format!("http://{addr}/v1")
    }

    fn request_complete(raw: &[u8]) -> bool {
        let text = String::from_utf8_lossy(raw);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let length = text[..header_end]
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        raw.len() >= header_end + 4 + length
    }

    fn local_config(api_url: String, timeout_secs: u64) -> AppConfig {
        let mut config = AppConfig {
            default_provider: "local".into(),
            ..AppConfig::default()
        };
        config.retry.timeout_secs = timeout_secs;
        config.providers.insert(
            "local".into(),
            ProviderConfig {
                api_key: Some("local-key".into()),
                api_url: Some(api_url),
                default_model: Some("m".into()),
            },
        );
        config
    }

    fn request() -> ProviderRequest {
        ProviderRequest {
            model: "m".into(),
            messages: vec![Message::user("안녕")],
            temperature: 0.7,
            max_tokens: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn configured_timeout_allows_slow_replies() {
        let url = slow_endpoint(Duration::from_secs(200)).await;
        let router = build_from_config(&local_config(url, 300));

        let response = router.default().unwrap().complete(request()).await.unwrap();
        assert_eq!(response.message, Message::assistant("늦었지만 답장"));
    }

    #[tokio::test(start_paused = true)]
    async fn configured_timeout_cuts_off_slow_replies() {
        let url = slow_endpoint(Duration::from_secs(200)).await;
        let router = build_from_config(&local_config(url, 30));

        let err = router.default().unwrap().complete(request()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Timeout(_)));
    }
}
