//! One open document: its FAQ board and an in-memory chat.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use gonggo_client::{ChatRoute, IntakeApi, smart_chat};
use gonggo_memory::{DocumentId, DocumentRecord, DocumentStore, StoreError};
use tokio::sync::mpsc;

use crate::faq::{ContextLimits, Faq, FaqBoard, FaqUpdate, FallbackRules, spawn_backfill};

pub const GREETING: &str =
    "Hello! Ask me anything about this document and I will answer from its content.";

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("document not found: {0}")]
    NotFound(DocumentId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: u64,
    pub content: String,
    pub is_user: bool,
    pub timestamp: DateTime<Utc>,
}

/// Owns the FAQ board of one record and applies backfilled answers to it.
pub struct DocumentSession<A> {
    api: Arc<A>,
    record: Arc<DocumentRecord>,
    board: FaqBoard,
    limits: ContextLimits,
    rules: FallbackRules,
    updates: Option<mpsc::UnboundedReceiver<FaqUpdate>>,
    messages: Vec<ChatMessage>,
    next_message_id: u64,
}

impl<A> std::fmt::Debug for DocumentSession<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentSession")
            .field("id", &self.record.id)
            .field("pending", &self.board.pending())
            .field("messages", &self.messages.len())
            .finish_non_exhaustive()
    }
}

impl<A: IntakeApi + 'static> DocumentSession<A> {
    #[must_use]
    pub fn new(api: Arc<A>, record: DocumentRecord) -> Self {
        let board = FaqBoard::from_record(&record);
        let mut session = Self {
            api,
            record: Arc::new(record),
            board,
            limits: ContextLimits::default(),
            rules: FallbackRules::default(),
            updates: None,
            messages: Vec::new(),
            next_message_id: 0,
        };
        session.push(GREETING.to_owned(), false);
        session
    }

    /// Load record `id` from `store`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotFound`] when the store has no such record.
    pub async fn open(
        api: Arc<A>,
        store: &dyn DocumentStore,
        id: &DocumentId,
    ) -> Result<Self, SessionError> {
        let record = store
            .get(id)
            .await?
            .ok_or_else(|| SessionError::NotFound(id.clone()))?;
        tracing::debug!(%id, questions = record.questions().len(), "session opened");
        Ok(Self::new(api, record))
    }

    #[must_use]
    pub fn with_limits(mut self, limits: ContextLimits) -> Self {
        self.limits = limits;
        self
    }

    #[must_use]
    pub fn with_rules(mut self, rules: FallbackRules) -> Self {
        self.rules = rules;
        self
    }

    #[must_use]
    pub fn record(&self) -> &DocumentRecord {
        &self.record
    }

    #[must_use]
    pub fn faqs(&self) -> &[Faq] {
        self.board.faqs()
    }

    #[must_use]
    pub fn board(&self) -> &FaqBoard {
        &self.board
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Start answering every pending FAQ. Calling it again is a no-op.
    pub fn start_backfill(&mut self) {
        if self.updates.is_some() || self.board.is_complete() {
            return;
        }
        tracing::info!(id = %self.record.id, pending = self.board.pending(), "FAQ backfill started");
        self.updates = Some(spawn_backfill(
            Arc::clone(&self.api),
            Arc::clone(&self.record),
            self.limits.clone(),
            self.rules.clone(),
        ));
    }

    /// Apply every answer that has already arrived; returns how many applied.
    pub fn apply_ready(&mut self) -> usize {
        let Some(rx) = self.updates.as_mut() else {
            return 0;
        };
        let mut applied = 0;
        while let Ok(update) = rx.try_recv() {
            if self.board.apply(update) {
                applied += 1;
            }
        }
        applied
    }

    /// Wait for the next answer and apply it. Returns the FAQ it resolved, or
    /// `None` once the backfill is finished.
    pub async fn next_answer(&mut self) -> Option<&Faq> {
        loop {
            let update = self.updates.as_mut()?.recv().await;
            let Some(update) = update else {
                self.updates = None;
                return None;
            };
            let id = update.id;
            if self.board.apply(update) {
                return self.board.get(id);
            }
        }
    }

    /// Wait until every FAQ is resolved.
    pub async fn wait_for_answers(&mut self) {
        while self.next_answer().await.is_some() {}
    }

    /// Write the resolved answers back to the stored record. Returns `false`
    /// when the record already holds them.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store write fails.
    pub async fn save_answers(&mut self, store: &dyn DocumentStore) -> Result<bool, StoreError> {
        let answers = self.board.answers();
        if answers == self.record.faq_answers {
            return Ok(false);
        }
        let mut record = DocumentRecord::clone(&self.record);
        record.faq_answers = answers;
        store.put(&record).await?;
        tracing::debug!(id = %record.id, answers = record.faq_answers.len(), "FAQ answers saved");
        self.record = Arc::new(record);
        Ok(true)
    }

    /// Route `question` through smart chat over this document and record both
    /// sides in the history. Blank questions are ignored.
    pub async fn ask(&mut self, question: &str) -> Option<(Option<ChatRoute>, &ChatMessage)> {
        let question = question.trim();
        if question.is_empty() {
            return None;
        }
        self.push(question.to_owned(), true);

        let result = smart_chat(
            self.api.as_ref(),
            question,
            &self.record.content,
            self.record.summary_text(),
        )
        .await;
        let (route, reply) = match result.into_result() {
            Ok((route, answer)) => (Some(route), answer.trim().to_owned()),
            Err((kind, error)) => {
                tracing::warn!(?kind, "chat failed: {error}");
                (
                    None,
                    format!("Sorry, an error occurred while generating a response: {error}"),
                )
            }
        };
        self.push(reply, false);
        self.messages.last().map(|m| (route, m))
    }

    fn push(&mut self, content: String, is_user: bool) {
        self.messages.push(ChatMessage {
            id: self.next_message_id,
            content,
            is_user,
            timestamp: Utc::now(),
        });
        self.next_message_id += 1;
    }
}
