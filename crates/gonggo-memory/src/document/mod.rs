pub mod error;
pub mod loader;
pub mod types;

pub use error::DocumentError;
pub use loader::{FileLoader, LoadedFile, MediaKind};
pub use types::{DocumentId, DocumentKind, DocumentRecord, FaqAnswer, find_chunk};

/// Default maximum upload size: 50 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;
