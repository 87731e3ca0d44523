//! Error types for the ReelChat domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use std::path::PathBuf;
use thiserror::Error;

use crate::state::Target;

/// The top-level error type for all ReelChat operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Collaborator errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),

    // --- Startup errors ---
    #[error("Knowledge table error: {0}")]
    Knowledge(#[from] KnowledgeError),

    // --- Routing errors ---
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    // --- Precondition violations ---
    #[error("Malformed conversation state: {0}")]
    MalformedState(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Provider '{0}' returned an empty reply")]
    EmptyReply(String),
}

impl ProviderError {
    /// Whether a retry has a chance of succeeding.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RateLimited { .. } | Self::Timeout(_) | Self::Network(_) => true,
            Self::ApiError { status_code, .. } => *status_code >= 500,
            Self::AuthenticationFailed(_) | Self::EmptyReply(_) => false,
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum RetrievalError {
    #[error("Passage index unavailable: {0}")]
    Unavailable(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),
}

#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("Failed to read {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("Failed to parse {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Invalid record at index {index}: {reason}")]
    InvalidRecord { index: usize, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("No handler registered for {0}")]
    MissingHandler(Target),

    #[error("Handler for {0} registered twice")]
    DuplicateHandler(Target),

    #[error("{0} cannot be used as a handler")]
    InvalidNode(Target),

    #[error("Route {from} -> {to} is not wired")]
    UnwiredRoute { from: Target, to: Target },

    #[error("Routing cycle: {0} requested twice without producing output")]
    RoutingCycle(Target),

    #[error("Turn exceeded {0} handler steps")]
    StepLimit(usize),

    #[error("{0} wrote output and delegated in the same step")]
    ConflictingHandoff(Target),

    #[error("Turn ended without a reply: {0}")]
    UnfinishedTurn(String),

    #[error("Dialogue graph already initialized")]
    AlreadyInitialized,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn unwired_route_names_both_ends() {
        let err = Error::Graph(GraphError::UnwiredRoute {
            from: Target::SubjectInfo,
            to: Target::RagReview,
        });
        let text = err.to_string();
        assert!(text.contains("subject_info"));
        assert!(text.contains("rag_review"));
    }

    #[test]
    fn transient_classification() {
        assert!(ProviderError::Timeout("slow".into()).is_transient());
        assert!(
            ProviderError::ApiError {
                status_code: 503,
                message: "unavailable".into()
            }
            .is_transient()
        );
        assert!(!ProviderError::AuthenticationFailed("bad key".into()).is_transient());
        assert!(!ProviderError::EmptyReply("openai".into()).is_transient());
    }
}
