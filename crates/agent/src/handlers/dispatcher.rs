//! The entry handler.
//!
//! Every turn starts here. The handler either answers directly (general chat),
//! hands the turn to a specialist, or, when a specialist has returned with a
//! prepared prompt, sends that prompt to the model verbatim and finalizes.
//! It is the only handler that calls the model.

use async_trait::async_trait;
use reelchat_core::error::{ProviderError, Result};
use reelchat_core::message::Message;
use reelchat_core::provider::{Provider, ProviderRequest};
use reelchat_core::state::{ConversationState, Target};
use std::sync::Arc;
use tracing::{debug, info};

use crate::handlers::Handler;
use crate::intent::{Intent, IntentClassifier};
use crate::prompt::build_chat_prompt;
use crate::settings::DialogueSettings;

pub struct ChatHandler {
    provider: Arc<dyn Provider>,
    classifier: IntentClassifier,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    window: usize,
}

impl ChatHandler {
    pub fn new(
        provider: Arc<dyn Provider>,
        classifier: IntentClassifier,
        settings: &DialogueSettings,
    ) -> Self {
        Self {
            provider,
            classifier,
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            window: settings.chat_window,
        }
    }

    /// One model call, then finalize the turn with its literal reply.
    async fn answer(&self, state: &mut ConversationState, prompt: String) -> Result<()> {
        let request = ProviderRequest {
            model: self.model.clone(),
            messages: vec![Message::user(prompt)],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self.provider.complete(request).await?;
        let reply = response.message.content;
        if reply.trim().is_empty() {
            return Err(ProviderError::EmptyReply(self.provider.name().to_string()).into());
        }

        if let Some(usage) = &response.usage {
            debug!(
                model = %response.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Model replied"
            );
        }

        state.finalize(reply);
        Ok(())
    }
}

#[async_trait]
impl Handler for ChatHandler {
    fn target(&self) -> Target {
        Target::Chat
    }

    async fn handle(&self, state: &mut ConversationState) -> Result<()> {
        if let Some(prompt) = state.take_prepared_prompt() {
            debug!("Finalizing prepared prompt");
            return self.answer(state, prompt).await;
        }

        match self.classifier.classify(&state.input) {
            Intent::Chat => {
                debug!("Answering directly");
                let prompt = build_chat_prompt(&state.input, state.history.window(self.window));
                self.answer(state, prompt).await
            }
            intent => {
                info!(target_node = %intent.target(), "Delegating turn");
                state.delegate(intent.target());
                Ok(())
            }
        }
    }
}
