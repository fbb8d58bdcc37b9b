//! Intake pipeline, FAQ backfill and document sessions.

pub mod config;
pub mod faq;
pub mod ingest;
pub mod notice;
pub mod session;

pub use config::Config;
pub use ingest::{IngestError, IngestInput, Ingestor, ProgressEvent, Stage};
pub use notice::{Notice, NoticeLevel};
pub use session::{ChatMessage, DocumentSession, SessionError};
