//! Banner messages shown after an ingestion attempt.

use std::fmt;

use gonggo_memory::{DocumentKind, DocumentRecord};

use crate::ingest::IngestError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    /// Success banner for a stored record, worded by input kind.
    #[must_use]
    pub fn ingested(record: &DocumentRecord) -> Self {
        let what = match record.kind {
            DocumentKind::Document if record.file_size.is_none() => "The text",
            DocumentKind::Document => "The file",
            DocumentKind::Image => "The image",
            DocumentKind::Link => "The link",
        };
        Self::success(format!(
            "{what} was analyzed successfully. {} questions were generated.",
            record.questions().len()
        ))
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

impl From<&IngestError> for Notice {
    fn from(err: &IngestError) -> Self {
        Self::error(err.user_message())
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            NoticeLevel::Success => write!(f, "[ok] {}", self.message),
            NoticeLevel::Error => write!(f, "[error] {}", self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use gonggo_client::GeneratedQuestion;
    use gonggo_memory::DocumentId;

    use super::*;
    use crate::ingest::{InputKind, ValidationError};

    fn record(kind: DocumentKind, file_size: Option<u64>) -> DocumentRecord {
        let mut r = DocumentRecord::new(DocumentId::from("1"), kind, "t", "c");
        r.file_size = file_size;
        r.generated_questions = Some(vec![GeneratedQuestion {
            id: 0,
            question: "q".into(),
            chunk_id: "0".into(),
            document_id: "d".into(),
        }]);
        r
    }

    #[test]
    fn success_wording_follows_input() {
        assert_eq!(
            Notice::ingested(&record(DocumentKind::Document, None)).message,
            "The text was analyzed successfully. 1 questions were generated."
        );
        assert!(
            Notice::ingested(&record(DocumentKind::Document, Some(10)))
                .message
                .starts_with("The file")
        );
        assert!(
            Notice::ingested(&record(DocumentKind::Link, None))
                .message
                .starts_with("The link")
        );
    }

    #[test]
    fn errors_use_user_message() {
        let err = IngestError::InsufficientContent {
            input: InputKind::Image,
        };
        let notice = Notice::from(&err);
        assert!(notice.is_error());
        assert_eq!(notice.message, err.user_message());

        let notice = Notice::from(&IngestError::Validation(ValidationError::EmptyInput));
        assert_eq!(notice.to_string(), "[error] Please enter some text, a link or a file.");
    }
}
