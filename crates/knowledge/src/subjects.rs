//! The subject knowledge table.
//!
//! A JSON array of [`SubjectRecord`]s, read once at process start. Lookup is
//! a case-insensitive substring match of a record's `id` or `name` against
//! the query, scanning in file order. The first match wins even when later
//! records also match; overlapping names are resolved by table order alone.

use reelchat_core::error::KnowledgeError;
use reelchat_core::subject::SubjectRecord;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct SubjectTable {
    records: Vec<SubjectRecord>,
}

impl SubjectTable {
    /// Build a table, rejecting records that could never match.
    pub fn from_records(records: Vec<SubjectRecord>) -> Result<Self, KnowledgeError> {
        if let Some(index) = records
            .iter()
            .position(|r| r.id.trim().is_empty() && r.name.trim().is_empty())
        {
            return Err(KnowledgeError::InvalidRecord {
                index,
                reason: "record has neither id nor name".into(),
            });
        }
        Ok(Self { records })
    }

    /// Parse a JSON array of subject records.
    pub fn from_json(content: &str, path: &Path) -> Result<Self, KnowledgeError> {
        let records: Vec<SubjectRecord> =
            serde_json::from_str(content).map_err(|e| KnowledgeError::Parse {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        Self::from_records(records)
    }

    /// Load the table from disk. Any failure here is fatal for startup.
    pub fn load(path: &Path) -> Result<Self, KnowledgeError> {
        let content = std::fs::read_to_string(path).map_err(|e| KnowledgeError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let table = Self::from_json(&content, path)?;
        debug!(path = %path.display(), subjects = table.len(), "Subject table loaded");
        Ok(table)
    }

    /// First record, in table order, whose id or name occurs in `query`.
    pub fn lookup(&self, query: &str) -> Option<&SubjectRecord> {
        let query_lower = query.to_lowercase();
        self.records.iter().find(|r| r.matches(&query_lower))
    }

    pub fn records(&self) -> &[SubjectRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
