//! Intent-routed chat over a document.

use crate::api::IntakeApi;
use crate::result::ApiResult;
use crate::types::Intent;

/// Which endpoint produced a smart-chat answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRoute {
    FaqAnswer,
    General,
}

/// Classify `question`, then answer it with the FAQ model (document-related)
/// or the general chat model.
///
/// The FAQ model gets `summary` as context when it is non-blank, `context`
/// otherwise. A failed classification fails the whole call.
pub async fn smart_chat<A: IntakeApi>(
    api: &A,
    question: &str,
    context: &str,
    summary: Option<&str>,
) -> ApiResult<(ChatRoute, String)> {
    let intent = api.classify_intent(question, context).await;
    let intent = match intent.into_result() {
        Ok(intent) => intent,
        Err((kind, error)) => {
            tracing::warn!(%error, "intent classification failed");
            return ApiResult::fail(kind, error);
        }
    };
    tracing::debug!(?intent, "chat routed");

    match intent {
        Intent::DocumentRelated => {
            let faq_context = summary
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(context);
            api.faq_answer(question, faq_context)
                .await
                .map(|answer| (ChatRoute::FaqAnswer, answer))
        }
        Intent::General => api
            .chat(question, context)
            .await
            .map(|answer| (ChatRoute::General, answer)),
    }
}
