//! Intake pipeline: parse, chunk, generate questions, summarize, persist.

mod error;
mod pipeline;
mod progress;
mod validate;


use std::path::PathBuf;
use std::sync::Arc;

use gonggo_client::IntakeApi;
use gonggo_memory::{ChunkerConfig, DocumentRecord, DocumentStore, FileLoader, TextChunker};

pub use error::{IngestError, InputKind, ValidationError};
pub use progress::{ProgressEvent, ProgressReporter, Stage};
pub use validate::{is_valid_url, normalize_url};

/// Exactly one thing to ingest.
#[derive(Debug, Clone)]
pub enum IngestInput {
    /// Plain text; a text that is itself a link is ingested as a URL.
    Text(String),
    Url(String),
    File(PathBuf),
}

/// Drives one input through the pipeline and persists the result.
pub struct Ingestor<A> {
    api: Arc<A>,
    store: Arc<dyn DocumentStore>,
    chunker: TextChunker,
    loader: FileLoader,
}

impl<A> std::fmt::Debug for Ingestor<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ingestor")
            .field("chunker", &self.chunker)
            .field("max_file_size", &self.loader.max_file_size)
            .finish_non_exhaustive()
    }
}

impl<A: IntakeApi> Ingestor<A> {
    #[must_use]
    pub fn new(api: Arc<A>, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            api,
            store,
            chunker: TextChunker::default(),
            loader: FileLoader::default(),
        }
    }

    #[must_use]
    pub fn with_chunker(mut self, config: ChunkerConfig) -> Self {
        self.chunker = TextChunker::new(config);
        self
    }

    #[must_use]
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.loader = FileLoader::new(bytes);
        self
    }

    /// Run the whole pipeline for `input`.
    ///
    /// The run ends with a `Done` event on success or an `Error` event whose
    /// label is the user-facing message.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError`] on validation failure, remote failure, when no
    /// questions can be generated, or when the record cannot be stored. Nothing
    /// is persisted in those cases.
    pub async fn run(
        &self,
        input: IngestInput,
        progress: &mut ProgressReporter,
    ) -> Result<DocumentRecord, IngestError> {
        match self.run_stages(input, progress).await {
            Ok(record) => {
                progress.advance(Stage::Done, 100, "Analysis complete");
                Ok(record)
            }
            Err(e) => {
                tracing::warn!(stage = %progress.stage(), "ingestion failed: {e}");
                progress.fail(e.user_message());
                Err(e)
            }
        }
    }
}
