//! Read-only knowledge sources for ReelChat.
//!
//! - [`SubjectTable`]: the static subject table, loaded once at startup
//! - [`ReviewIndex`]: review passages ranked against a query

pub mod reviews;
pub mod similarity;
pub mod subjects;

pub use reviews::{ReviewIndex, ReviewRecord};
pub use similarity::{bigram_profile, cosine_similarity};
pub use subjects::SubjectTable;
