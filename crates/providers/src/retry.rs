//! Bounded retry around a single provider.
//!
//! Each attempt runs under its own timeout. Only transient failures
//! (network, timeout, rate limit, 5xx) are retried; the last error is
//! returned to the caller once attempts run out.

use async_trait::async_trait;
use reelchat_core::error::ProviderError;
use reelchat_core::provider::*;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Delay before the second attempt; doubles on each further attempt.
const INITIAL_BACKOFF: Duration = Duration::from_millis(500);

pub struct RetryProvider {
    inner: Arc<dyn Provider>,
    max_attempts: u32,
    timeout: Duration,
}

impl RetryProvider {
    pub fn new(inner: Arc<dyn Provider>, max_attempts: u32, timeout: Duration) -> Self {
        Self {
            inner,
            max_attempts: max_attempts.max(1),
            timeout,
        }
    }
}

#[async_trait]
impl Provider for RetryProvider {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        let provider_name = self.inner.name().to_string();
        let mut delay = INITIAL_BACKOFF;
        let mut attempt = 1;

        loop {
            let outcome =
                match tokio::time::timeout(self.timeout, self.inner.complete(request.clone()))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(ProviderError::Timeout(format!(
                        "Provider '{}' timed out after {}s",
                        provider_name,
                        self.timeout.as_secs()
                    ))),
                };

            match outcome {
                Ok(response) => {
                    if attempt > 1 {
                        info!(provider = %provider_name, attempt, "Retry: provider recovered");
                    }
                    return Ok(response);
                }
                Err(e) if e.is_transient() && attempt < self.max_attempts => {
                    warn!(
                        provider = %provider_name,
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "Retry: transient provider failure"
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelchat_core::message::Message;
    use std::sync::Mutex;

    /// Fails with the scripted errors, then succeeds.
    struct FlakyProvider {
        failures: Mutex<Vec<ProviderError>>,
        call_count: Mutex<usize>,
    }

    impl FlakyProvider {
        fn new(failures: Vec<ProviderError>) -> Self {
            Self {
                failures: Mutex::new(failures),
                call_count: Mutex::new(0),
            }
        }

        fn calls(&self) -> usize {
            *self.call_count.lock().unwrap()
        }
    }

    #[async_trait]
    impl Provider for FlakyProvider {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn complete(
            &self,
            _request: ProviderRequest,
        ) -> Result<ProviderResponse, ProviderError> {
            *self.call_count.lock().unwrap() += 1;
            let mut failures = self.failures.lock().unwrap();
            if failures.is_empty() {
                Ok(ProviderResponse {
                    message: Message::assistant("ok"),
                    usage: None,
                    model: "mock".into(),
                })
            } else {
                Err(failures.remove(0))
            }
        }
    }

    /// Never answers.
    struct HangingProvider;

    #[async_trait]
    impl Provider for HangingProvider {
        fn name(&self) -> &str {
            "hanging"
        }

        async fn complete(
            &self,
            _request: ProviderRequest,
        ) -> Result<ProviderResponse, ProviderError> {
            std::future::pending().await
        }
    }

    fn request() -> ProviderRequest {
        ProviderRequest {
            model: "mock".into(),
            messages: vec![Message::user("hi")],
            temperature: 0.7,
            max_tokens: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn retries_transient_errors() {
        let inner = Arc::new(FlakyProvider::new(vec![
            ProviderError::Network("reset".into()),
            ProviderError::RateLimited { retry_after_secs: 1 },
        ]));
        let retry = RetryProvider::new(inner.clone(), 3, Duration::from_secs(5));

        let response = retry.complete(request()).await.unwrap();
        assert_eq!(response.message.content, "ok");
        assert_eq!(inner.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_attempts() {
        let inner = Arc::new(FlakyProvider::new(vec![
            ProviderError::Network("a".into()),
            ProviderError::Network("b".into()),
            ProviderError::Network("c".into()),
        ]));
        let retry = RetryProvider::new(inner.clone(), 2, Duration::from_secs(5));

        let err = retry.complete(request()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Network(ref m) if m == "b"));
        assert_eq!(inner.calls(), 2);
    }

    #[tokio::test]
    async fn permanent_errors_are_not_retried() {
        let inner = Arc::new(FlakyProvider::new(vec![
            ProviderError::AuthenticationFailed("bad key".into()),
        ]));
        let retry = RetryProvider::new(inner.clone(), 5, Duration::from_secs(5));

        assert!(retry.complete(request()).await.is_err());
        assert_eq!(inner.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn attempt_timeout_surfaces_as_timeout() {
        let retry = RetryProvider::new(Arc::new(HangingProvider), 1, Duration::from_secs(2));
        let err = retry.complete(request()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Timeout(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_attempts_still_calls_once() {
        let inner = Arc::new(FlakyProvider::new(vec![ProviderError::Network("a".into())]));
        let retry = RetryProvider::new(inner.clone(), 0, Duration::from_secs(1));

        assert!(retry.complete(request()).await.is_err());
        assert_eq!(inner.calls(), 1);
    }
}
