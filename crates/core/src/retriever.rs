//! Retriever trait: ranked passage lookup for grounded answers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RetrievalError;

/// A retrieved passage with its relevance score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    pub text: String,
    pub score: f32,
}

impl Passage {
    pub fn new(text: impl Into<String>, score: f32) -> Self {
        Self {
            text: text.into(),
            score,
        }
    }
}

/// Returns up to `k` passages for a query, most relevant first.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// The backend name (e.g., "review_index").
    fn name(&self) -> &str;

    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<Passage>, RetrievalError>;
}
