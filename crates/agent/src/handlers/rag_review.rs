//! Retrieval-augmented review specialist.
//!
//! Sends the raw query to the retriever, embeds the returned passages in
//! rank order, and prepares an instruction for the entry handler. A retrieval
//! failure fails the turn; zero passages is not a failure.

use async_trait::async_trait;
use reelchat_core::error::Result;
use reelchat_core::retriever::Retriever;
use reelchat_core::state::{ConversationState, Target};
use std::sync::Arc;
use tracing::{debug, info};

use crate::handlers::Handler;
use crate::prompt::build_rag_prompt;

pub struct RagReviewHandler {
    retriever: Arc<dyn Retriever>,
    top_k: usize,
    window: usize,
}

impl RagReviewHandler {
    pub fn new(retriever: Arc<dyn Retriever>, top_k: usize, window: usize) -> Self {
        Self {
            retriever,
            top_k,
            window,
        }
    }
}

#[async_trait]
impl Handler for RagReviewHandler {
    fn target(&self) -> Target {
        Target::RagReview
    }

    async fn handle(&self, state: &mut ConversationState) -> Result<()> {
        let passages = self.retriever.retrieve(&state.input, self.top_k).await?;
        info!(
            retriever = self.retriever.name(),
            passages = passages.len(),
            "Passages retrieved"
        );
        for (rank, passage) in passages.iter().enumerate() {
            debug!(rank, score = passage.score, "Passage");
        }

        let texts: Vec<String> = passages.into_iter().map(|p| p.text).collect();
        let prompt = build_rag_prompt(&state.input, &texts, state.history.window(self.window));

        state.delegate_with_prompt(Target::Chat, prompt);
        Ok(())
    }
}
