//! FAQ board and asynchronous answer backfill.

mod backfill;
mod context;
mod fallback;

pub use backfill::{answer_question, is_retryable, spawn_backfill};
pub use context::{AnswerContext, ContextLimits, ContextOrigin, build_context, truncate_chars};
pub use fallback::{FallbackRule, FallbackRules};

use gonggo_client::GeneratedQuestion;
use gonggo_memory::{DocumentRecord, FaqAnswer};

pub const PLACEHOLDER_ANSWER: &str = "Generating an answer...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerSource {
    Pending,
    Model,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Faq {
    /// Stable id of the generated question this FAQ answers.
    pub id: usize,
    pub question: String,
    pub answer: String,
    pub source: AnswerSource,
}

/// Resolved answer for one FAQ, sent by a backfill task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaqUpdate {
    pub id: usize,
    pub question: String,
    pub answer: String,
    pub source: AnswerSource,
}

/// FAQs of one document, updated in place as answers arrive.
#[derive(Debug, Clone, Default)]
pub struct FaqBoard {
    faqs: Vec<Faq>,
}

impl FaqBoard {
    #[must_use]
    pub fn from_questions(questions: &[GeneratedQuestion]) -> Self {
        let faqs = questions
            .iter()
            .map(|q| Faq {
                id: q.id,
                question: q.question.clone(),
                answer: PLACEHOLDER_ANSWER.to_owned(),
                source: AnswerSource::Pending,
            })
            .collect();
        Self { faqs }
    }

    /// Board for `record`, with answers already stored on it filled in.
    #[must_use]
    pub fn from_record(record: &DocumentRecord) -> Self {
        let mut board = Self::from_questions(record.questions());
        for faq in &mut board.faqs {
            if let Some(stored) = record.answer_for(faq.id) {
                faq.answer.clone_from(&stored.answer);
                faq.source = if stored.fallback {
                    AnswerSource::Fallback
                } else {
                    AnswerSource::Model
                };
            }
        }
        board
    }

    /// Resolved answers in board order, as stored on the record.
    #[must_use]
    pub fn answers(&self) -> Vec<FaqAnswer> {
        self.faqs
            .iter()
            .filter(|f| f.source != AnswerSource::Pending)
            .map(|f| FaqAnswer {
                id: f.id,
                answer: f.answer.clone(),
                fallback: f.source == AnswerSource::Fallback,
            })
            .collect()
    }

    #[must_use]
    pub fn faqs(&self) -> &[Faq] {
        &self.faqs
    }

    #[must_use]
    pub fn get(&self, id: usize) -> Option<&Faq> {
        self.faqs.iter().find(|f| f.id == id)
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.faqs
            .iter()
            .filter(|f| f.source == AnswerSource::Pending)
            .count()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.pending() == 0
    }

    /// Apply `update` to the FAQ with the same id.
    ///
    /// Returns `false` when no FAQ has that id. A differing question text is
    /// logged and the update still applies.
    pub fn apply(&mut self, update: FaqUpdate) -> bool {
        let Some(faq) = self.faqs.iter_mut().find(|f| f.id == update.id) else {
            tracing::warn!(id = update.id, "answer for unknown FAQ dropped");
            return false;
        };
        if faq.question != update.question {
            tracing::warn!(
                id = update.id,
                expected = %faq.question,
                received = %update.question,
                "FAQ question text mismatch"
            );
        }
        faq.answer = update.answer;
        faq.source = update.source;
        true
    }
}
