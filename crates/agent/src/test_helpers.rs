//! Shared test doubles for handler and graph tests.

use async_trait::async_trait;
use reelchat_core::error::{ProviderError, RetrievalError};
use reelchat_core::message::Message;
use reelchat_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use reelchat_core::retriever::{Passage, Retriever};
use reelchat_knowledge::SubjectTable;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// A provider that returns scripted replies in order and records every request.
///
/// Panics if called more often than it has replies.
pub struct MockProvider {
    replies: Mutex<VecDeque<Result<String, ProviderError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl MockProvider {
    pub fn new(replies: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(t.to_string())).collect())
    }

    pub fn failing(error: ProviderError) -> Self {
        Self::new(vec![Err(error)])
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// The single user message of the most recent request.
    pub fn last_prompt(&self) -> Option<String> {
        self.requests
            .lock()
            .unwrap()
            .last()
            .and_then(|r| r.messages.first().map(|m| m.content.clone()))
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let model = request.model.clone();
        self.requests.lock().unwrap().push(request);

        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("MockProvider: no more replies (call #{})", self.call_count()));

        reply.map(|text| ProviderResponse {
            message: Message::assistant(text),
            usage: Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
            model,
        })
    }
}

/// A retriever that returns fixed passages and records the queries it saw.
pub struct StubRetriever {
    result: Result<Vec<Passage>, RetrievalError>,
    queries: Mutex<Vec<(String, usize)>>,
}

impl StubRetriever {
    pub fn with_passages(passages: &[(&str, f32)]) -> Self {
        Self {
            result: Ok(passages.iter().map(|(t, s)| Passage::new(*t, *s)).collect()),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: RetrievalError) -> Self {
        Self {
            result: Err(error),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<(String, usize)> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Retriever for StubRetriever {
    fn name(&self) -> &str {
        "stub"
    }

    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<Passage>, RetrievalError> {
        self.queries.lock().unwrap().push((query.to_string(), k));
        self.result.clone()
    }
}

/// Two overlapping movie records plus one person.
pub fn sample_subjects() -> Arc<SubjectTable> {
    let table = SubjectTable::from_json(
        r#"[
            {"id": "ironman", "name": "아이언맨", "type": "movie",
             "summary": "천재 발명가 토니 스타크의 이야기",
             "spec": {"감독": "존 파브로", "개봉": "2008", "러닝타임": "126분"}},
            {"id": "ironman2", "name": "아이언맨 2", "type": "movie", "summary": "속편"},
            {"id": "rdj", "name": "로버트 다우니 주니어", "type": "person", "summary": "배우"}
        ]"#,
        Path::new("subjects.json"),
    )
    .unwrap();
    Arc::new(table)
}
