use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use gonggo_client::{Chunk, ChunkMapping, GeneratedQuestion, ParsedDocument};
use serde::{Deserialize, Serialize};

static LAST_ID: AtomicU64 = AtomicU64::new(0);

/// Time-based document id: milliseconds since the Unix epoch, strictly
/// increasing within a process.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    #[must_use]
    pub fn generate() -> Self {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
        let mut last = LAST_ID.load(Ordering::Relaxed);
        loop {
            let next = now.max(last + 1);
            match LAST_ID.compare_exchange_weak(last, next, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return Self(next.to_string()),
                Err(observed) => last = observed,
            }
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Store key, `document_<id>`.
    #[must_use]
    pub fn storage_key(&self) -> String {
        format!("document_{}", self.0)
    }

    /// Numeric value for ordering; ids that are not numbers sort first.
    #[must_use]
    pub fn millis(&self) -> u64 {
        self.0.parse().unwrap_or_default()
    }
}

impl From<&str> for DocumentId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for DocumentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Document,
    Image,
    Link,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Document => "document",
            Self::Image => "image",
            Self::Link => "link",
        })
    }
}

/// Answer written back to a record once its FAQ is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqAnswer {
    /// Id of the generated question.
    pub id: usize,
    pub answer: String,
    /// Produced by the local rules instead of the answer model.
    #[serde(default)]
    pub fallback: bool,
}

/// Persisted result of one successful ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    pub id: DocumentId,
    #[serde(rename = "type")]
    pub kind: DocumentKind,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parsed_data: Option<ParsedDocument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_questions: Option<Vec<GeneratedQuestion>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_mapping: Option<Vec<ChunkMapping>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_preview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    /// Chunks sent for question generation, when they differ from `parsed_data`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_chunks: Option<Vec<Chunk>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub faq_answers: Vec<FaqAnswer>,
}

impl DocumentRecord {
    #[must_use]
    pub fn new(
        id: DocumentId,
        kind: DocumentKind,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id,
            kind,
            title: title.into(),
            content: content.into(),
            url: None,
            uploaded_at: Utc::now(),
            parsed_data: None,
            generated_questions: None,
            chunk_mapping: None,
            summary: None,
            image_preview: None,
            file_size: None,
            question_chunks: None,
            faq_answers: Vec::new(),
        }
    }

    #[must_use]
    pub fn questions(&self) -> &[GeneratedQuestion] {
        self.generated_questions.as_deref().unwrap_or_default()
    }

    /// Summary text when present and non-blank.
    #[must_use]
    pub fn summary_text(&self) -> Option<&str> {
        self.summary.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// Chunk a question was generated from, looked up among the chunks that
    /// were sent for question generation.
    #[must_use]
    pub fn chunk_for(&self, question: &GeneratedQuestion) -> Option<&Chunk> {
        let chunks = match &self.question_chunks {
            Some(chunks) => chunks,
            None => &self.parsed_data.as_ref()?.chunks,
        };
        find_chunk(chunks, question)
    }

    #[must_use]
    pub fn answer_for(&self, id: usize) -> Option<&FaqAnswer> {
        self.faq_answers.iter().find(|a| a.id == id)
    }
}

/// Match on document and chunk id first, then on chunk id alone.
#[must_use]
pub fn find_chunk<'a>(chunks: &'a [Chunk], question: &GeneratedQuestion) -> Option<&'a Chunk> {
    chunks
        .iter()
        .find(|c| c.document_id == question.document_id && c.chunk_id == question.chunk_id)
        .or_else(|| chunks.iter().find(|c| c.chunk_id == question.chunk_id))
}
