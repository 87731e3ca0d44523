//! # ReelChat Core
//!
//! Domain types, collaborator traits, and error definitions for the ReelChat
//! dialogue engine. This crate has no framework dependencies: it defines the
//! conversation model that the handler graph mutates and the interfaces of
//! the external collaborators (language model, passage retrieval) it calls.
//!
//! ## Layout
//!
//! - [`message`]: role/content pairs exchanged with the model
//! - [`history`]: the append-only conversation ledger
//! - [`state`]: the caller-owned per-conversation state and routing targets
//! - [`provider`]: the language-model collaborator
//! - [`retriever`]: the passage retrieval collaborator
//! - [`subject`]: knowledge table records

pub mod error;
pub mod history;
pub mod message;
pub mod provider;
pub mod retriever;
pub mod state;
pub mod subject;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use history::History;
pub use message::{Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse};
pub use retriever::{Passage, Retriever};
pub use state::{ConversationId, ConversationState, Target};
pub use subject::SubjectRecord;
