//! Graph nodes.
//!
//! A handler reads the conversation state, may call its collaborators, and
//! either finalizes the turn or names the next target. It must never do both
//! in the same step; the executor rejects that as a conflicting hand-off.

pub mod dispatcher;
pub mod rag_review;
pub mod subject_info;

pub use dispatcher::ChatHandler;
pub use rag_review::RagReviewHandler;
pub use subject_info::SubjectInfoHandler;

use async_trait::async_trait;
use reelchat_core::error::Result;
use reelchat_core::state::{ConversationState, Target};

#[async_trait]
pub trait Handler: Send + Sync {
    /// The node this handler serves.
    fn target(&self) -> Target;

    /// Run one step of the turn against `state`.
    async fn handle(&self, state: &mut ConversationState) -> Result<()>;
}
