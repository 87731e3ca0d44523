//! Intent classification for the entry handler.
//!
//! Deterministic and model-free, so classifying a turn never costs a
//! provider call. Order of checks:
//!
//! 1. any review keyword → [`Intent::RagReview`]
//! 2. a subject table hit, or any info keyword → [`Intent::SubjectInfo`]
//! 3. otherwise → [`Intent::Chat`]

use reelchat_config::RoutingConfig;
use reelchat_core::state::Target;
use reelchat_knowledge::SubjectTable;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Answer directly.
    Chat,
    /// Hand off to the subject lookup handler.
    SubjectInfo,
    /// Hand off to the review retrieval handler.
    RagReview,
}

impl Intent {
    /// The handler that serves this intent.
    pub fn target(self) -> Target {
        match self {
            Intent::Chat => Target::Chat,
            Intent::SubjectInfo => Target::SubjectInfo,
            Intent::RagReview => Target::RagReview,
        }
    }
}

pub struct IntentClassifier {
    subjects: Arc<SubjectTable>,
    review_keywords: Vec<String>,
    info_keywords: Vec<String>,
}

impl IntentClassifier {
    pub fn new(subjects: Arc<SubjectTable>, routing: &RoutingConfig) -> Self {
        let lower = |words: &[String]| -> Vec<String> {
            words
                .iter()
                .map(|w| w.trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect()
        };

        Self {
            subjects,
            review_keywords: lower(&routing.review_keywords),
            info_keywords: lower(&routing.info_keywords),
        }
    }

    pub fn classify(&self, query: &str) -> Intent {
        let query_lower = query.to_lowercase();
        let mentions = |words: &[String]| words.iter().any(|w| query_lower.contains(w.as_str()));

        if mentions(&self.review_keywords) {
            Intent::RagReview
        } else if mentions(&self.info_keywords) || self.subjects.lookup(query).is_some() {
            Intent::SubjectInfo
        } else {
            Intent::Chat
        }
    }
}
