//! The conversation history ledger.
//!
//! Append-only: a completed turn adds exactly one user entry followed by one
//! assistant entry. Entries are never reordered, edited, or removed. Readers
//! take a trailing window, oldest entry first.

use serde::{Deserialize, Serialize};

use crate::message::Message;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    entries: Vec<Message>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one completed turn. This is the only way entries are added.
    pub fn record_turn(&mut self, user_input: impl Into<String>, reply: impl Into<String>) {
        self.entries.push(Message::user(user_input));
        self.entries.push(Message::assistant(reply));
    }

    /// The last `n` entries in original order (all of them if fewer exist).
    pub fn window(&self, n: usize) -> &[Message] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }

    pub fn entries(&self) -> &[Message] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
