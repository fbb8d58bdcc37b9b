//! Client for the remote document-parsing and model services.
//!
//! Every operation returns an [`ApiResult`]: transport failures, timeouts and
//! non-2xx statuses are folded into `success: false` instead of surfacing as
//! Rust errors.

pub mod api;
pub mod client;
pub mod error;
pub mod http;
#[cfg(feature = "mock")]
pub mod mock;
pub mod questions;
pub mod result;
pub mod routing;
pub mod types;

pub use api::IntakeApi;
pub use client::{ClientConfig, IntakeClient};
pub use error::ClientError;
pub use result::{ApiResult, ErrorKind};
pub use routing::{ChatRoute, smart_chat};
pub use types::{Chunk, ChunkMapping, FileUpload, GeneratedQuestion, Intent, ParsedDocument};
