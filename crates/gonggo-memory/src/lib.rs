//! Chunking, file loading and persistence of ingested documents.

pub mod chunker;
pub mod document;
pub mod error;
pub mod store;

pub use chunker::{ChunkerConfig, TextChunker};
pub use document::{
    DEFAULT_MAX_FILE_SIZE, DocumentError, DocumentId, DocumentKind, DocumentRecord, FaqAnswer,
    FileLoader, LoadedFile, MediaKind, find_chunk,
};
pub use error::StoreError;
pub use store::{DocumentStore, FileStore, InMemoryStore};
