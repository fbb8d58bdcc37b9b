use serde_json::Value;

use crate::result::ApiResult;
use crate::types::{Chunk, FileUpload, GeneratedQuestion, Intent, ParsedDocument};

/// Remote operations used by ingestion and the document session.
///
/// Implementations never fail past this boundary: every outcome, including
/// transport errors and timeouts, is an [`ApiResult`].
pub trait IntakeApi: Send + Sync {
    fn parse_document_from_url(
        &self,
        url: &str,
    ) -> impl Future<Output = ApiResult<ParsedDocument>> + Send;

    fn process_image(
        &self,
        file: &FileUpload,
    ) -> impl Future<Output = ApiResult<ParsedDocument>> + Send;

    /// Parse an office document, using the HWP endpoint for `.hwp` files.
    fn process_document(
        &self,
        file: &FileUpload,
    ) -> impl Future<Output = ApiResult<ParsedDocument>> + Send;

    /// Generate questions for `chunks`, already normalized into one shape.
    fn generate_questions(
        &self,
        chunks: &[Chunk],
    ) -> impl Future<Output = ApiResult<Vec<GeneratedQuestion>>> + Send;

    fn generate_summary(&self, text: &str) -> impl Future<Output = ApiResult<String>> + Send;

    fn classify_intent(
        &self,
        query: &str,
        context: &str,
    ) -> impl Future<Output = ApiResult<Intent>> + Send;

    fn faq_answer(
        &self,
        question: &str,
        context: &str,
    ) -> impl Future<Output = ApiResult<String>> + Send;

    fn chat(&self, question: &str, context: &str) -> impl Future<Output = ApiResult<String>> + Send;

    fn search_documents(&self, query: &str) -> impl Future<Output = ApiResult<Value>> + Send;

    fn health_check(&self) -> impl Future<Output = ApiResult<String>> + Send;
}
