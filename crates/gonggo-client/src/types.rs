use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Contiguous span of a document's text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    #[serde(default)]
    pub document_id: String,
    #[serde(deserialize_with = "string_or_number")]
    pub chunk_id: String,
    #[serde(default)]
    pub source: String,
}

impl Chunk {
    #[must_use]
    pub fn new(
        document_id: impl Into<String>,
        chunk_id: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            chunk_id: chunk_id.into(),
            source: source.into(),
        }
    }
}

/// Output of server-side or client-side decomposition of one input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedDocument {
    #[serde(default)]
    pub document_id: String,
    #[serde(default)]
    pub chunks: Vec<Chunk>,
}

impl ParsedDocument {
    /// Non-blank chunk texts joined by a blank line.
    #[must_use]
    pub fn full_text(&self) -> String {
        self.chunks
            .iter()
            .map(|c| c.source.as_str())
            .filter(|s| !s.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Parse endpoints answer either with the document itself or wrapped in `{document: ...}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ParseResponse {
    Wrapped { document: ParsedDocument },
    Bare(ParsedDocument),
}

impl From<ParseResponse> for ParsedDocument {
    fn from(value: ParseResponse) -> Self {
        match value {
            ParseResponse::Wrapped { document } | ParseResponse::Bare(document) => document,
        }
    }
}

/// One question attributed to exactly one source chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedQuestion {
    pub id: usize,
    pub question: String,
    pub chunk_id: String,
    pub document_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMapping {
    pub chunk_id: String,
    pub source: String,
}

/// In-memory file ready for a multipart upload.
#[derive(Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    #[must_use]
    pub fn new(file_name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Lower-cased extension of the file name, without the dot.
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
    }

    #[must_use]
    pub fn is_hwp(&self) -> bool {
        self.extension().as_deref() == Some("hwp")
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

impl fmt::Debug for FileUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileUpload")
            .field("file_name", &self.file_name)
            .field("mime", &self.mime)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Envelope returned by the model endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct ModelEnvelope<T> {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub msg: Option<String>,
    pub data: Option<T>,
    #[serde(default)]
    pub elapsed_time: Option<f64>,
}

impl<T> ModelEnvelope<T> {
    pub(crate) fn is_success(&self) -> bool {
        self.status.eq_ignore_ascii_case("success")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    DocumentRelated,
    General,
}

impl Intent {
    #[must_use]
    pub fn from_flag(document_related: bool) -> Self {
        if document_related {
            Self::DocumentRelated
        } else {
            Self::General
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Int(n) => n.to_string(),
        Id::Float(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_id_accepts_numbers() {
        let c: Chunk =
            serde_json::from_str(r#"{"document_id":"d","chunk_id":3,"source":"x"}"#).unwrap();
        assert_eq!(c.chunk_id, "3");
    }

    #[test]
    fn parse_response_bare() {
        let raw = r#"{"document_id":"d","chunks":[{"document_id":"d","chunk_id":"0","source":"a"}]}"#;
        let doc: ParsedDocument = serde_json::from_str::<ParseResponse>(raw).unwrap().into();
        assert_eq!(doc.document_id, "d");
        assert_eq!(doc.chunks.len(), 1);
    }

    #[test]
    fn parse_response_wrapped() {
        let raw = r#"{"document":{"document_id":"w","chunks":[{"chunk_id":"0","source":"a"},{"chunk_id":"1","source":"b"}]}}"#;
        let doc: ParsedDocument = serde_json::from_str::<ParseResponse>(raw).unwrap().into();
        assert_eq!(doc.document_id, "w");
        assert_eq!(doc.full_text(), "a\n\nb");
    }

    #[test]
    fn full_text_skips_blank_chunks() {
        let doc = ParsedDocument {
            document_id: "img".into(),
            chunks: vec![
                Chunk::new("img", "0", "  "),
                Chunk::new("img", "1", "apply"),
                Chunk::new("img", "2", ""),
                Chunk::new("img", "3", "by May 31"),
            ],
        };
        assert_eq!(doc.full_text(), "apply\n\nby May 31");
    }

    #[test]
    fn hwp_detection_is_case_insensitive() {
        assert!(FileUpload::new("report.HWP", "application/octet-stream", vec![]).is_hwp());
        assert!(!FileUpload::new("report.pdf", "application/pdf", vec![]).is_hwp());
        assert!(!FileUpload::new("hwp", "application/octet-stream", vec![]).is_hwp());
    }

    #[test]
    fn upload_debug_omits_bytes() {
        let upload = FileUpload::new("a.png", "image/png", vec![1, 2, 3]);
        let debug = format!("{upload:?}");
        assert!(debug.contains("size: 3"));
        assert!(!debug.contains("[1, 2, 3]"));
    }

    #[test]
    fn envelope_status_check() {
        let env: ModelEnvelope<bool> =
            serde_json::from_str(r#"{"status":"success","msg":"","data":true,"elapsed_time":0.2}"#)
                .unwrap();
        assert!(env.is_success());
        assert_eq!(env.data, Some(true));
    }
}
