//! Per-conversation state threaded through the handler graph.
//!
//! The calling application owns a [`ConversationState`] across turns and
//! lends it mutably to the graph for one turn at a time. `next_target` and
//! `prepared_prompt` are transient: they only carry meaning inside a turn and
//! are reset by [`ConversationState::begin_turn`].

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::history::History;

/// Unique identifier for a conversation (session).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub String);

impl ConversationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A routing directive set by a handler before it returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// Terminate the turn.
    End,
    /// The subject lookup handler.
    SubjectInfo,
    /// The retrieval-augmented review handler.
    RagReview,
    /// The entry handler (dispatcher).
    Chat,
}

impl Target {
    pub fn as_str(self) -> &'static str {
        match self {
            Target::End => "end",
            Target::SubjectInfo => "subject_info",
            Target::RagReview => "rag_review",
            Target::Chat => "chat",
        }
    }

    pub fn is_end(self) -> bool {
        self == Target::End
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationState {
    #[serde(default)]
    pub id: ConversationId,

    /// Current user utterance.
    #[serde(default)]
    pub input: String,

    /// Finalized reply for the current turn.
    #[serde(default)]
    pub output: String,

    #[serde(default)]
    pub history: History,

    #[serde(skip)]
    pub next_target: Option<Target>,

    /// Instruction built by a specialist for the entry handler to finalize.
    #[serde(skip)]
    pub prepared_prompt: Option<String>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the new utterance and clear everything left over from the last turn.
    pub fn begin_turn(&mut self, input: impl Into<String>) {
        self.input = input.into();
        self.clear_turn();
    }

    /// Drop the reply and any routing leftovers, keeping input and history.
    pub fn clear_turn(&mut self) {
        self.output.clear();
        self.next_target = None;
        self.prepared_prompt = None;
    }

    /// Hand control to another handler without producing output.
    pub fn delegate(&mut self, target: Target) {
        self.next_target = Some(target);
    }

    /// Hand a fully built instruction to `target` for finalization.
    pub fn delegate_with_prompt(&mut self, target: Target, prompt: String) {
        self.prepared_prompt = Some(prompt);
        self.next_target = Some(target);
    }

    /// Write the reply, record the turn, and end it.
    ///
    /// This is the single place a turn enters the history ledger.
    pub fn finalize(&mut self, reply: String) {
        self.history.record_turn(self.input.clone(), reply.clone());
        self.output = reply;
        self.prepared_prompt = None;
        self.next_target = Some(Target::End);
    }

    /// Read and clear the routing directive. An unset directive means END.
    pub fn take_next_target(&mut self) -> Target {
        self.next_target.take().unwrap_or(Target::End)
    }

    pub fn take_prepared_prompt(&mut self) -> Option<String> {
        self.prepared_prompt.take()
    }
}
