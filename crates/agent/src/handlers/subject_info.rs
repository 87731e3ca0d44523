//! Subject lookup specialist.
//!
//! Finds the first knowledge-table record named in the query and prepares a
//! grounded instruction for the entry handler. Never calls the model.

use async_trait::async_trait;
use reelchat_core::error::Result;
use reelchat_core::state::{ConversationState, Target};
use reelchat_knowledge::SubjectTable;
use std::sync::Arc;
use tracing::info;

use crate::handlers::Handler;
use crate::prompt::{
    build_subject_info_context, build_subject_info_prompt, build_subject_missing_prompt,
};

pub struct SubjectInfoHandler {
    subjects: Arc<SubjectTable>,
    window: usize,
}

impl SubjectInfoHandler {
    pub fn new(subjects: Arc<SubjectTable>, window: usize) -> Self {
        Self { subjects, window }
    }
}

#[async_trait]
impl Handler for SubjectInfoHandler {
    fn target(&self) -> Target {
        Target::SubjectInfo
    }

    async fn handle(&self, state: &mut ConversationState) -> Result<()> {
        let history = state.history.window(self.window);

        let prompt = match self.subjects.lookup(&state.input) {
            Some(record) => {
                info!(subject = %record.id, "Subject matched");
                let context = build_subject_info_context(record);
                build_subject_info_prompt(&state.input, &context, history)
            }
            None => {
                info!("No subject matched");
                build_subject_missing_prompt(&state.input, history)
            }
        };

        state.delegate_with_prompt(Target::Chat, prompt);
        Ok(())
    }
}
