//! Prompt builders for the three handler types.
//!
//! Pure functions: each takes the query, handler-specific context, and a
//! trailing history window, and renders the exact instruction text sent to
//! the model. Layout is always role framing, optional history block, the
//! query, then a numbered list of answer guidelines.

use reelchat_core::message::Message;
use reelchat_core::subject::SubjectRecord;

const CHAT_ROLE: &str = "당신은 도움이 되는 AI 어시스턴트입니다. \
사용자와 자연스럽고 친근한 대화를 나누며 질문에 답변해주세요.";

const CHAT_GUIDELINES: [&str; 5] = [
    "친근하고 자연스러운 톤으로 답변",
    "대화 히스토리를 참고하여 맥락을 이해",
    "도움이 되는 정보를 제공",
    "마크다운 포맷 사용 가능",
    "한국어로 답변",
];

const SUBJECT_ROLE: &str = "다음 주제 정보를 바탕으로 사용자 질문에 자연스럽게 답변해주세요.";

const SUBJECT_GUIDELINES: [&str; 5] = [
    "친근하고 자연스러운 톤으로 답변",
    "질문에 적절한 수준의 정보 제공",
    "대화 히스토리를 참고하여 맥락을 이해",
    "마크다운 포맷 사용 가능",
    "한국어로 답변",
];

const SUBJECT_MISSING_GUIDELINES: [&str; 5] = [
    "요청한 주제 정보를 찾지 못했다는 사실을 먼저 알리기",
    "확인되지 않은 사실을 지어내지 않기",
    "대화 히스토리를 참고하여 맥락을 이해",
    "정확한 작품명이나 인물명으로 다시 질문하도록 안내",
    "한국어로 답변",
];

const RAG_ROLE: &str = "당신은 영화 리뷰 요약/참조를 도와주는 조수입니다. \
주어진 컨텍스트만을 근거로 답변해주세요.";

const RAG_GUIDELINES: [&str; 5] = [
    "컨텍스트만을 근거로 답변",
    "대화 히스토리를 참고하여 맥락을 이해",
    "필요 시 참고 문장을 인용",
    "간결하고 정확한 정보 제공",
    "한국어로 답변",
];

const NO_PASSAGES: &str = "(관련 리뷰를 찾지 못했습니다)";

/// Render a history window as `speaker: content` lines under a header.
/// Empty history renders as an empty string.
pub fn history_block(history: &[Message]) -> String {
    if history.is_empty() {
        return String::new();
    }

    let lines: Vec<String> = history
        .iter()
        .map(|m| format!("{}: {}", m.role.speaker_label(), m.content))
        .collect();

    format!("\n[대화 히스토리]\n{}\n", lines.join("\n"))
}

fn guideline_list(items: &[&str]) -> String {
    let mut out = String::from("답변 가이드라인:");
    for (i, item) in items.iter().enumerate() {
        out.push_str(&format!("\n{}. {}", i + 1, item));
    }
    out
}

/// General chat: the entry handler answering directly.
pub fn build_chat_prompt(query: &str, history: &[Message]) -> String {
    format!(
        "{CHAT_ROLE}\n{}\n사용자 질문: {query}\n\n{}\n",
        history_block(history),
        guideline_list(&CHAT_GUIDELINES),
    )
}

/// Context block describing one subject record.
pub fn build_subject_info_context(record: &SubjectRecord) -> String {
    let summary = if record.summary.trim().is_empty() {
        "정보 없음"
    } else {
        record.summary.as_str()
    };

    format!(
        "주제 정보:\n- 이름: {}\n- 타입: {}\n- 요약: {}\n- 상세 정보: {}\n",
        record.name,
        record.kind,
        summary,
        record.spec_line(),
    )
}

/// Subject answer grounded in a context block from [`build_subject_info_context`].
pub fn build_subject_info_prompt(query: &str, context: &str, history: &[Message]) -> String {
    format!(
        "{SUBJECT_ROLE}\n\n{context}\n{}\n사용자 질문: {query}\n\n{}\n",
        history_block(history),
        guideline_list(&SUBJECT_GUIDELINES),
    )
}

/// Subject lookup found nothing: ask the model to say so instead of guessing.
pub fn build_subject_missing_prompt(query: &str, history: &[Message]) -> String {
    format!(
        "{SUBJECT_ROLE}\n\n주제 정보:\n- 조회 결과: 지식 테이블에서 질문과 일치하는 주제를 찾지 못했습니다.\n\n{}\n사용자 질문: {query}\n\n{}\n",
        history_block(history),
        guideline_list(&SUBJECT_MISSING_GUIDELINES),
    )
}

/// Review answer grounded only in the retrieved passages, kept in the order given.
pub fn build_rag_prompt(query: &str, passages: &[String], history: &[Message]) -> String {
    let context = if passages.is_empty() {
        format!("\n- {NO_PASSAGES}")
    } else {
        passages.iter().map(|p| format!("\n- {p}")).collect()
    };

    format!(
        "{RAG_ROLE}\n{}\n사용자 질문: {query}\n\n[컨텍스트]{context}\n\n{}\n",
        history_block(history),
        guideline_list(&RAG_GUIDELINES),
    )
}
