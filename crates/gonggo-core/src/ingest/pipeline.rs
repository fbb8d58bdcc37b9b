use gonggo_client::{Chunk, ChunkMapping, GeneratedQuestion, IntakeApi, ParsedDocument};
use gonggo_memory::{
    DocumentError, DocumentId, DocumentKind, DocumentRecord, LoadedFile, MediaKind, find_chunk,
};

use super::validate::normalize_url;
use super::{
    IngestError, IngestInput, Ingestor, InputKind, ProgressReporter, Stage, ValidationError,
};

/// Chunks with at most this many trimmed chars count as "no text" in an image.
const MIN_IMAGE_CHUNK_CHARS: usize = 10;

const TEXT_TITLE: &str = "Text analysis";

enum Validated {
    Text(String),
    Url(String),
    File(LoadedFile),
}

/// Identity and display fields of the record being built.
struct RecordMeta {
    id: DocumentId,
    kind: DocumentKind,
    input: InputKind,
    title: String,
    url: Option<String>,
    image_preview: Option<String>,
    file_size: Option<u64>,
}

struct Parsed {
    meta: RecordMeta,
    content: String,
    parsed: ParsedDocument,
    question_chunks: Vec<Chunk>,
}

struct Questioned {
    parsed: Parsed,
    questions: Vec<GeneratedQuestion>,
    mapping: Vec<ChunkMapping>,
}

struct Summarized {
    questioned: Questioned,
    summary: String,
}

impl<A: IntakeApi> Ingestor<A> {
    pub(super) async fn run_stages(
        &self,
        input: IngestInput,
        progress: &mut ProgressReporter,
    ) -> Result<DocumentRecord, IngestError> {
        let validated = self.validate(input).await?;
        let parsed = self.parse(validated, progress).await?;
        let questioned = self.generate_questions(parsed, progress).await?;
        let summarized = self.summarize(questioned, progress).await;
        self.persist(summarized, progress).await
    }

    async fn validate(&self, input: IngestInput) -> Result<Validated, ValidationError> {
        match input {
            IngestInput::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return Err(ValidationError::EmptyInput);
                }
                Ok(match normalize_url(trimmed) {
                    Some(url) => Validated::Url(url),
                    None => Validated::Text(trimmed.to_owned()),
                })
            }
            IngestInput::Url(raw) => {
                if raw.trim().is_empty() {
                    return Err(ValidationError::EmptyInput);
                }
                normalize_url(&raw)
                    .map(Validated::Url)
                    .ok_or_else(|| ValidationError::InvalidUrl(raw.trim().to_owned()))
            }
            IngestInput::File(path) => {
                let loaded = self.loader.load(&path).await.map_err(|e| match e {
                    DocumentError::FileTooLarge { size, limit } => {
                        ValidationError::FileTooLarge { size, limit }
                    }
                    other => ValidationError::Unreadable(other.to_string()),
                })?;
                if loaded.size == 0 {
                    return Err(ValidationError::EmptyInput);
                }
                Ok(Validated::File(loaded))
            }
        }
    }

    async fn parse(
        &self,
        validated: Validated,
        progress: &mut ProgressReporter,
    ) -> Result<Parsed, IngestError> {
        let id = DocumentId::generate();
        match validated {
            Validated::Text(text) => {
                progress.advance(Stage::Parsing, 10, "Reading text");
                progress.advance(Stage::Chunking, 25, "Splitting text into chunks");
                let chunks = self.chunker.split(id.as_str(), &text);
                tracing::debug!(chunks = chunks.len(), chars = text.chars().count(), "text chunked");
                Ok(Parsed {
                    meta: RecordMeta {
                        kind: DocumentKind::Document,
                        input: InputKind::Text,
                        title: TEXT_TITLE.to_owned(),
                        url: None,
                        image_preview: None,
                        file_size: None,
                        id: id.clone(),
                    },
                    content: text,
                    parsed: ParsedDocument {
                        document_id: id.to_string(),
                        chunks: chunks.clone(),
                    },
                    question_chunks: chunks,
                })
            }
            Validated::Url(url) => {
                progress.advance(Stage::Parsing, 20, "Analyzing link");
                let parsed = self
                    .api
                    .parse_document_from_url(&url)
                    .await
                    .into_result()
                    .map_err(|(kind, message)| IngestError::Remote {
                        stage: Stage::Parsing,
                        input: InputKind::Url,
                        kind,
                        message,
                    })?;
                Ok(Parsed {
                    meta: RecordMeta {
                        id,
                        kind: DocumentKind::Link,
                        input: InputKind::Url,
                        title: format!("Link analysis: {url}"),
                        url: Some(url),
                        image_preview: None,
                        file_size: None,
                    },
                    content: parsed.full_text(),
                    question_chunks: parsed.chunks.clone(),
                    parsed,
                })
            }
            Validated::File(file) => self.parse_file(id, file, progress).await,
        }
    }

    async fn parse_file(
        &self,
        id: DocumentId,
        file: LoadedFile,
        progress: &mut ProgressReporter,
    ) -> Result<Parsed, IngestError> {
        let (input, kind, result) = match file.media {
            MediaKind::Image => {
                progress.advance(Stage::Parsing, 30, "Analyzing image");
                let result = self.api.process_image(&file.upload).await;
                (InputKind::Image, DocumentKind::Image, result)
            }
            MediaKind::Document => {
                progress.advance(Stage::Parsing, 25, "Parsing document");
                let result = self.api.process_document(&file.upload).await;
                (InputKind::Document, DocumentKind::Document, result)
            }
        };
        let parsed = result
            .into_result()
            .map_err(|(kind, message)| IngestError::Remote {
                stage: Stage::Parsing,
                input,
                kind,
                message,
            })?;

        let question_chunks = match input {
            InputKind::Image => merge_sparse_chunks(&parsed),
            _ => parsed.chunks.clone(),
        };
        let image_preview = (input == InputKind::Image).then(|| file.data_url());

        Ok(Parsed {
            meta: RecordMeta {
                id,
                kind,
                input,
                title: file.upload.file_name.clone(),
                url: None,
                image_preview,
                file_size: Some(file.size),
            },
            content: parsed.full_text(),
            question_chunks,
            parsed,
        })
    }

    async fn generate_questions(
        &self,
        parsed: Parsed,
        progress: &mut ProgressReporter,
    ) -> Result<Questioned, IngestError> {
        let input = parsed.meta.input;
        if parsed.question_chunks.is_empty() {
            return Err(IngestError::InsufficientContent { input });
        }

        progress.advance(Stage::GeneratingQuestions, 50, "Generating frequently asked questions");
        let questions = self
            .api
            .generate_questions(&parsed.question_chunks)
            .await
            .into_result()
            .map_err(|(kind, message)| IngestError::Remote {
                stage: Stage::GeneratingQuestions,
                input,
                kind,
                message,
            })?;

        if questions.is_empty() {
            tracing::info!(id = %parsed.meta.id, "no questions generated");
            return Err(IngestError::InsufficientContent { input });
        }

        let mapping = map_questions(&questions, &parsed.question_chunks);
        tracing::debug!(questions = questions.len(), mapped = mapping.len(), "questions generated");
        Ok(Questioned {
            parsed,
            questions,
            mapping,
        })
    }

    async fn summarize(&self, questioned: Questioned, progress: &mut ProgressReporter) -> Summarized {
        let text = questioned.parsed.content.trim();
        if text.is_empty() {
            return Summarized {
                questioned,
                summary: String::new(),
            };
        }

        progress.advance(Stage::GeneratingSummary, 75, "Generating summary");
        let result = self.api.generate_summary(text).await;
        let summary = match result.into_result() {
            Ok(summary) => summary,
            Err((kind, error)) => {
                tracing::warn!(?kind, "summary generation failed, storing without summary: {error}");
                String::new()
            }
        };
        Summarized {
            questioned,
            summary,
        }
    }

    async fn persist(
        &self,
        summarized: Summarized,
        progress: &mut ProgressReporter,
    ) -> Result<DocumentRecord, IngestError> {
        progress.advance(Stage::Persisting, 90, "Saving document");
        let Summarized {
            questioned,
            summary,
        } = summarized;
        let Questioned {
            parsed,
            questions,
            mapping,
        } = questioned;
        let Parsed {
            meta,
            content,
            parsed,
            question_chunks,
        } = parsed;

        let mut record = DocumentRecord::new(meta.id, meta.kind, meta.title, content);
        record.url = meta.url;
        record.question_chunks = (question_chunks != parsed.chunks).then_some(question_chunks);
        record.parsed_data = Some(parsed);
        record.generated_questions = Some(questions);
        record.chunk_mapping = Some(mapping);
        record.summary = Some(summary);
        record.image_preview = meta.image_preview;
        record.file_size = meta.file_size;

        self.store.put(&record).await?;
        tracing::info!(id = %record.id, kind = %record.kind, "document stored");
        Ok(record)
    }
}

/// Merge all chunk texts into one chunk `"0"` when no chunk carries real text.
fn merge_sparse_chunks(parsed: &ParsedDocument) -> Vec<Chunk> {
    let has_text = parsed
        .chunks
        .iter()
        .any(|c| c.source.trim().chars().count() > MIN_IMAGE_CHUNK_CHARS);
    if has_text || parsed.chunks.is_empty() {
        return parsed.chunks.clone();
    }

    let combined = parsed
        .chunks
        .iter()
        .map(|c| c.source.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let combined = combined.trim();
    if combined.is_empty() {
        return parsed.chunks.clone();
    }
    vec![Chunk::new(parsed.document_id.clone(), "0", combined)]
}

fn map_questions(questions: &[GeneratedQuestion], chunks: &[Chunk]) -> Vec<ChunkMapping> {
    questions
        .iter()
        .filter_map(|q| {
            find_chunk(chunks, q).map(|c| ChunkMapping {
                chunk_id: c.chunk_id.clone(),
                source: c.source.clone(),
            })
        })
        .collect()
}
