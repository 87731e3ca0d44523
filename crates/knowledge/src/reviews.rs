//! Review passage index: the retrieval collaborator for grounded answers.
//!
//! Reviews are loaded from a JSONL file (one object per line). Each review
//! becomes one passage; its bigram profile is computed once at load time.

use async_trait::async_trait;
use reelchat_core::error::RetrievalError;
use reelchat_core::retriever::{Passage, Retriever};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

use crate::similarity::{Profile, bigram_profile, cosine_similarity};

/// One line of the reviews file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub review: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

struct IndexedPassage {
    text: String,
    profile: Profile,
}

pub struct ReviewIndex {
    passages: Vec<IndexedPassage>,
}

impl ReviewIndex {
    /// Index the given review texts in order. Blank texts are skipped.
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let passages = texts
            .into_iter()
            .map(Into::into)
            .filter(|text: &String| !text.trim().is_empty())
            .map(|text| IndexedPassage {
                profile: bigram_profile(&text),
                text,
            })
            .collect();
        Self { passages }
    }

    /// Load a JSONL reviews file. Corrupted lines are skipped with a warning.
    /// An unreadable file, or one that yields no passages, is an error.
    pub fn load(path: &Path) -> Result<Self, RetrievalError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RetrievalError::Unavailable(format!("Failed to read {}: {e}", path.display()))
        })?;

        let records = content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .filter_map(|(line_no, line)| {
                match serde_json::from_str::<ReviewRecord>(line) {
                    Ok(record) => Some(record.review),
                    Err(e) => {
                        warn!(line = line_no + 1, error = %e, "Skipping corrupted review line");
                        None
                    }
                }
            });

        let index = Self::from_texts(records);
        if index.is_empty() {
            return Err(RetrievalError::Unavailable(format!(
                "No review passages indexed from {}",
                path.display()
            )));
        }
        debug!(path = %path.display(), passages = index.len(), "Review index loaded");
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    /// Rank passages against `query`, best first; ties keep file order.
    pub fn search(&self, query: &str, k: usize) -> Vec<Passage> {
        let query_profile = bigram_profile(query);

        let mut scored: Vec<Passage> = self
            .passages
            .iter()
            .map(|p| Passage::new(p.text.clone(), cosine_similarity(&query_profile, &p.profile)))
            .filter(|p| p.score > 0.0)
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        scored
    }
}

#[async_trait]
impl Retriever for ReviewIndex {
    fn name(&self) -> &str {
        "review_index"
    }

    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<Passage>, RetrievalError> {
        if self.passages.is_empty() {
            return Err(RetrievalError::Unavailable("review index is empty".into()));
        }
        Ok(self.search(query, k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ReviewIndex {
        ReviewIndex::from_texts([
            "배우들의 연기가 정말 훌륭했다",
            "스토리가 지루하고 너무 길었다",
            "",
            "연기는 좋았지만 스토리가 아쉬웠다",
        ])
    }

    #[test]
    fn blank_texts_are_not_indexed() {
        assert_eq!(sample().len(), 3);
    }

    #[test]
    fn search_orders_by_relevance() {
        let results = sample().search("연기 어땠어", 4);
        assert!(!results.is_empty());
        assert!(results[0].text.contains("연기"));
        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn search_respects_k_and_drops_zero_scores() {
        let index = sample();
        assert_eq!(index.search("스토리 연기", 1).len(), 1);
        assert!(index.search("zzz", 4).is_empty());
        assert!(index.search("연기", 0).is_empty());
    }

    #[test]
    fn ties_keep_file_order() {
        let index = ReviewIndex::from_texts(["좋은 영화", "좋은 영화"]);
        let results = index.search("좋은 영화", 2);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].score, results[1].score);
    }

    #[test]
    fn load_skips_corrupted_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reviews.jsonl");
        std::fs::write(
            &path,
            concat!(
                r#"{"review": "음악이 최고였다", "rating": 10, "date": "2024-05-01"}"#,
                "\n",
                "not json\n",
                "\n",
                r#"{"review": "결말이 뻔했다", "rating": 4}"#,
                "\n",
            ),
        )
        .unwrap();

        let index = ReviewIndex::load(&path).unwrap();
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn load_with_no_usable_lines_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reviews.jsonl");
        std::fs::write(&path, "not json\n{\"rating\": 3}\n\n{\"review\": \"  \"}\n").unwrap();

        let err = ReviewIndex::load(&path).err().unwrap();
        assert!(matches!(err, RetrievalError::Unavailable(ref m) if m.contains("No review passages")));
    }

    #[test]
    fn load_missing_file_is_unavailable() {
        let err = ReviewIndex::load(Path::new("/nonexistent/reviews.jsonl"))
            .err()
            .unwrap();
        assert!(matches!(err, RetrievalError::Unavailable(_)));
    }

    #[tokio::test]
    async fn retrieve_on_empty_index_fails_loudly() {
        let index = ReviewIndex::from_texts(Vec::<String>::new());
        assert!(index.retrieve("연기", 4).await.is_err());
    }

    #[tokio::test]
    async fn retrieve_returns_ranked_passages() {
        let passages = sample().retrieve("스토리", 4).await.unwrap();
        assert_eq!(passages.len(), 2);
        assert!(passages.iter().all(|p| p.text.contains("스토리")));
    }
}
