use std::time::Duration;

use gonggo_client::GeneratedQuestion;
use gonggo_memory::DocumentRecord;

/// Caps for FAQ answer contexts, in chars.
#[derive(Debug, Clone)]
pub struct ContextLimits {
    pub summary_cap: usize,
    pub chunk_cap: usize,
    pub chunk_min: usize,
    pub retry_cap: usize,
    pub retry_delay: Duration,
}

impl Default for ContextLimits {
    fn default() -> Self {
        Self {
            summary_cap: 800,
            chunk_cap: 600,
            chunk_min: 200,
            retry_cap: 300,
            retry_delay: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextOrigin {
    Summary,
    Chunk,
    Document,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerContext {
    pub text: String,
    pub origin: ContextOrigin,
}

/// First `max` chars of `text`.
#[must_use]
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Context for answering `question`: the summary, else the question's chunk,
/// else the whole document.
#[must_use]
pub fn build_context(
    record: &DocumentRecord,
    question: &GeneratedQuestion,
    limits: &ContextLimits,
) -> AnswerContext {
    if let Some(summary) = record.summary_text() {
        return AnswerContext {
            text: truncate_chars(summary.trim(), limits.summary_cap).to_owned(),
            origin: ContextOrigin::Summary,
        };
    }

    if let Some(chunk) = record.chunk_for(question)
        && !chunk.source.trim().is_empty()
    {
        let mut text = truncate_chars(chunk.source.trim(), limits.chunk_cap).to_owned();
        let len = text.chars().count();
        if len < limits.chunk_min {
            let room = limits.chunk_cap.saturating_sub(len + 2);
            let padding = truncate_chars(record.content.trim(), room);
            if !padding.is_empty() {
                text.push_str("\n\n");
                text.push_str(padding);
            }
        }
        return AnswerContext {
            text,
            origin: ContextOrigin::Chunk,
        };
    }

    AnswerContext {
        text: record.content.clone(),
        origin: ContextOrigin::Document,
    }
}
