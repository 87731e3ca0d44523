//! Subject records from the static knowledge table.

use serde::{Deserialize, Serialize};

/// One entry of the knowledge table (a film, a person, a franchise...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectRecord {
    pub id: String,

    pub name: String,

    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default)]
    pub summary: String,

    /// Free-form attributes, kept in file order.
    #[serde(default)]
    pub spec: serde_json::Map<String, serde_json::Value>,
}

impl SubjectRecord {
    /// Case-insensitive: does the query mention this record's id or name?
    ///
    /// `query_lower` must already be lowercased.
    pub fn matches(&self, query_lower: &str) -> bool {
        let mentions = |key: &str| !key.is_empty() && query_lower.contains(&key.to_lowercase());
        mentions(&self.name) || mentions(&self.id)
    }

    /// Attributes rendered as `key: value` pairs joined by `, `.
    pub fn spec_line(&self) -> String {
        self.spec
            .iter()
            .map(|(key, value)| match value {
                serde_json::Value::String(s) => format!("{key}: {s}"),
                other => format!("{key}: {other}"),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iron_man() -> SubjectRecord {
        serde_json::from_str(
            r#"{
                "id": "ironman",
                "name": "아이언맨",
                "type": "movie",
                "summary": "천재 발명가 토니 스타크의 이야기",
                "spec": {"감독": "존 파브로", "개봉": "2008", "러닝타임": 126}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn matches_name_or_id_case_insensitively() {
        let record = iron_man();
        assert!(record.matches("아이언맨 정보"));
        assert!(record.matches(&"Tell me about IRONMAN".to_lowercase()));
        assert!(!record.matches("인셉션 정보"));
    }

    #[test]
    fn spec_line_keeps_file_order() {
        assert_eq!(
            iron_man().spec_line(),
            "감독: 존 파브로, 개봉: 2008, 러닝타임: 126"
        );
    }

    #[test]
    fn empty_keys_never_match() {
        let record = SubjectRecord {
            id: String::new(),
            name: String::new(),
            kind: String::new(),
            summary: String::new(),
            spec: serde_json::Map::new(),
        };
        assert!(!record.matches("anything"));
    }
}
