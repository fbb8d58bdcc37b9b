use std::sync::Arc;

use gonggo_client::{ErrorKind, GeneratedQuestion, IntakeApi};
use gonggo_memory::DocumentRecord;
use tokio::sync::mpsc;

use super::context::{ContextLimits, build_context, truncate_chars};
use super::fallback::FallbackRules;
use super::{AnswerSource, FaqUpdate};

const CONTEXT_LENGTH_MARKERS: &[&str] = &[
    "context length",
    "context_length",
    "maximum context",
    "too many tokens",
    "token limit",
];

/// Failures worth one more attempt with a shorter context: HTTP 5xx,
/// timeouts and context-length errors.
#[must_use]
pub fn is_retryable(kind: ErrorKind, message: &str) -> bool {
    if kind.is_server_error() || kind == ErrorKind::Timeout {
        return true;
    }
    let lower = message.to_lowercase();
    CONTEXT_LENGTH_MARKERS.iter().any(|m| lower.contains(m))
}

/// Answer one question: model call, one retry on a retryable failure, then
/// the local fallback rules.
pub async fn answer_question<A: IntakeApi>(
    api: &A,
    record: &DocumentRecord,
    question: &GeneratedQuestion,
    limits: &ContextLimits,
    rules: &FallbackRules,
) -> FaqUpdate {
    let context = build_context(record, question, limits);
    tracing::debug!(id = question.id, origin = ?context.origin, "answering FAQ");

    let first = api.faq_answer(&question.question, &context.text).await;
    let failure = match first.into_result() {
        Ok(answer) => return model_update(question, answer),
        Err(failure) => failure,
    };

    let (kind, error) = failure;
    if is_retryable(kind, &error) {
        tracing::warn!(id = question.id, ?kind, "FAQ answer failed, retrying with shorter context: {error}");
        tokio::time::sleep(limits.retry_delay).await;
        let short = truncate_chars(&context.text, limits.retry_cap);
        match api.faq_answer(&question.question, short).await.into_result() {
            Ok(answer) => return model_update(question, answer),
            Err((_, error)) => {
                tracing::warn!(id = question.id, "FAQ answer retry failed: {error}");
            }
        }
    } else {
        tracing::warn!(id = question.id, ?kind, "FAQ answer failed: {error}");
    }

    FaqUpdate {
        id: question.id,
        question: question.question.clone(),
        answer: rules.answer(&question.question, &record.title, &record.content),
        source: AnswerSource::Fallback,
    }
}

fn model_update(question: &GeneratedQuestion, answer: String) -> FaqUpdate {
    FaqUpdate {
        id: question.id,
        question: question.question.clone(),
        answer: answer.trim().to_owned(),
        source: AnswerSource::Model,
    }
}

/// Spawn one task per question of `record` that has no stored answer yet.
///
/// Updates arrive in completion order; the channel closes once every task
/// has finished.
pub fn spawn_backfill<A: IntakeApi + 'static>(
    api: Arc<A>,
    record: Arc<DocumentRecord>,
    limits: ContextLimits,
    rules: FallbackRules,
) -> mpsc::UnboundedReceiver<FaqUpdate> {
    let (tx, rx) = mpsc::unbounded_channel();
    let limits = Arc::new(limits);
    let rules = Arc::new(rules);

    let pending = record
        .questions()
        .iter()
        .filter(|q| record.answer_for(q.id).is_none())
        .cloned()
        .collect::<Vec<_>>();
    for question in pending {
        let api = Arc::clone(&api);
        let record = Arc::clone(&record);
        let limits = Arc::clone(&limits);
        let rules = Arc::clone(&rules);
        let tx = tx.clone();
        tokio::spawn(async move {
            let update = answer_question(api.as_ref(), &record, &question, &limits, &rules).await;
            if tx.send(update).is_err() {
                tracing::debug!(id = question.id, "FAQ board closed before answer arrived");
            }
        });
    }
    rx
}
