//! The dialogue graph: the heart of ReelChat.
//!
//! One user turn flows through a small, fixed graph of handlers:
//!
//! 1. **chat** classifies the input (general chat, subject lookup, reviews)
//! 2. general chat is answered right away with one model call
//! 3. otherwise a **specialist** gathers grounding (a knowledge-table record
//!    or retrieved review passages), builds the instruction, and returns it
//!    to **chat**
//! 4. **chat** sends the prepared instruction to the model and finalizes
//!
//! Every completed turn makes exactly one model call and appends exactly one
//! (input, reply) pair to the conversation history.

pub mod graph;
pub mod handlers;
pub mod intent;
pub mod prompt;
pub mod settings;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use graph::{DialogueGraph, GraphBuilder, MAX_STEPS, global, init};
pub use handlers::{ChatHandler, Handler, RagReviewHandler, SubjectInfoHandler};
pub use intent::{Intent, IntentClassifier};
pub use settings::DialogueSettings;
