use std::time::Duration;

use reqwest::RequestBuilder;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::api::IntakeApi;
use crate::error::{ClientError, Result};
use crate::questions::normalize_questions;
use crate::result::ApiResult;
use crate::types::{
    Chunk, FileUpload, GeneratedQuestion, Intent, ModelEnvelope, ParseResponse, ParsedDocument,
};

const MAX_ERROR_BODY: usize = 500;

/// Endpoints and deadlines for [`IntakeClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the parsing service (`/parse-document/`, `/generate-questions/`, ...).
    pub kintel_base_url: String,
    /// Base URL of the model service (`/summarization`, `/intent`, ...).
    pub models_base_url: String,
    pub parse_timeout: Duration,
    pub summary_timeout: Duration,
    /// Transport default for every other operation.
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            kintel_base_url: "http://127.0.0.1:3000/api/kintel".into(),
            models_base_url: "http://127.0.0.1:3000/api/models".into(),
            parse_timeout: Duration::from_secs(30),
            summary_timeout: Duration::from_secs(120),
            request_timeout: Duration::from_secs(600),
        }
    }
}

/// HTTP implementation of [`IntakeApi`].
#[derive(Debug, Clone)]
pub struct IntakeClient {
    client: reqwest::Client,
    config: ClientConfig,
}

impl IntakeClient {
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        let client = crate::http::default_client(config.request_timeout);
        Self { client, config }
    }

    /// Use a caller-provided HTTP client (shared connection pool, custom TLS).
    #[must_use]
    pub fn with_client(client: reqwest::Client, config: ClientConfig) -> Self {
        Self { client, config }
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn kintel(&self, path: &str) -> String {
        format!("{}{path}", self.config.kintel_base_url.trim_end_matches('/'))
    }

    fn models(&self, path: &str) -> String {
        format!("{}{path}", self.config.models_base_url.trim_end_matches('/'))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|e| ClientError::from_transport(operation, e))?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            body.truncate(floor_char_boundary(&body, MAX_ERROR_BODY));
            tracing::warn!(operation, %status, "request failed");
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ClientError::from_transport(operation, e))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        url: String,
        body: &Value,
        timeout: Option<Duration>,
    ) -> Result<T> {
        tracing::debug!(operation, %url, "POST");
        let mut request = self.client.post(url).json(body);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        self.send(operation, request).await
    }

    async fn post_multipart<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        url: String,
        file: &FileUpload,
    ) -> Result<T> {
        tracing::debug!(operation, %url, file = %file.file_name, size = file.size(), "upload");
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.mime)
            .map_err(|e| ClientError::Upload(e.to_string()))?;
        let form = Form::new().part("file", part);
        self.send(operation, self.client.post(url).multipart(form))
            .await
    }

    async fn post_model<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
        body: &Value,
        timeout: Option<Duration>,
    ) -> Result<T> {
        let envelope: ModelEnvelope<T> =
            self.post_json(operation, self.models(path), body, timeout).await?;
        unwrap_envelope(operation, envelope)
    }

    async fn parse_url(&self, url: &str) -> Result<ParsedDocument> {
        let response: ParseResponse = self
            .post_json(
                "parse url",
                self.kintel("/parse-document-from-url/"),
                &json!({ "url": url }),
                Some(self.config.parse_timeout),
            )
            .await?;
        Ok(response.into())
    }

    async fn upload(&self, operation: &'static str, path: &str, file: &FileUpload) -> Result<ParsedDocument> {
        let response: ParseResponse = self
            .post_multipart(operation, self.kintel(path), file)
            .await?;
        Ok(response.into())
    }

    async fn questions(&self, chunks: &[Chunk]) -> Result<Vec<GeneratedQuestion>> {
        let body = serde_json::to_value(chunks)?;
        let payload: Value = self
            .post_json("generate questions", self.kintel("/generate-questions/"), &body, None)
            .await?;
        let questions = normalize_questions(&payload);
        tracing::debug!(count = questions.len(), "questions normalized");
        Ok(questions)
    }

    async fn health(&self) -> Result<String> {
        let operation = "health";
        let url = self.models("/health/faq_answer_model");
        tracing::debug!(operation, %url, "GET");
        let envelope: ModelEnvelope<Value> = self.send(operation, self.client.get(url)).await?;
        if envelope.is_success() {
            Ok(envelope.msg.unwrap_or_else(|| "OK".to_owned()))
        } else {
            Err(remote_failure(operation, envelope.msg))
        }
    }
}

fn unwrap_envelope<T>(operation: &'static str, envelope: ModelEnvelope<T>) -> Result<T> {
    if !envelope.is_success() {
        return Err(remote_failure(operation, envelope.msg));
    }
    if let Some(elapsed) = envelope.elapsed_time {
        tracing::debug!(operation, elapsed, "model call finished");
    }
    envelope
        .data
        .ok_or(ClientError::EmptyResponse { operation })
}

fn remote_failure(operation: &'static str, msg: Option<String>) -> ClientError {
    match msg {
        Some(msg) if !msg.trim().is_empty() => ClientError::Remote(msg),
        _ => ClientError::Remote(format!("{operation} failed")),
    }
}

fn floor_char_boundary(s: &str, max: usize) -> usize {
    if s.len() <= max {
        return s.len();
    }
    let mut idx = max;
    while !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn finish<T>(operation: &'static str, result: Result<T>) -> ApiResult<T> {
    if let Err(e) = &result {
        tracing::warn!(operation, error = %e, "call failed");
    }
    result.into()
}

impl IntakeApi for IntakeClient {
    async fn parse_document_from_url(&self, url: &str) -> ApiResult<ParsedDocument> {
        finish("parse url", self.parse_url(url).await)
    }

    async fn process_image(&self, file: &FileUpload) -> ApiResult<ParsedDocument> {
        finish("process image", self.upload("process image", "/process-image/", file).await)
    }

    async fn process_document(&self, file: &FileUpload) -> ApiResult<ParsedDocument> {
        let path = if file.is_hwp() {
            "/parse-document-hwp/"
        } else {
            "/parse-document/"
        };
        finish("process document", self.upload("process document", path, file).await)
    }

    async fn generate_questions(&self, chunks: &[Chunk]) -> ApiResult<Vec<GeneratedQuestion>> {
        finish("generate questions", self.questions(chunks).await)
    }

    async fn generate_summary(&self, text: &str) -> ApiResult<String> {
        let result = self
            .post_model(
                "summary",
                "/summarization",
                &json!({ "context": text }),
                Some(self.config.summary_timeout),
            )
            .await;
        finish("summary", result)
    }

    async fn classify_intent(&self, query: &str, context: &str) -> ApiResult<Intent> {
        let result = self
            .post_model::<bool>(
                "intent",
                "/intent",
                &json!({ "query": query, "context": context }),
                None,
            )
            .await
            .map(Intent::from_flag);
        finish("intent", result)
    }

    async fn faq_answer(&self, question: &str, context: &str) -> ApiResult<String> {
        let result = self
            .post_model(
                "faq answer",
                "/faq_answer_model",
                &json!({ "question": question, "context": context }),
                None,
            )
            .await;
        finish("faq answer", result)
    }

    async fn chat(&self, question: &str, context: &str) -> ApiResult<String> {
        let result = self
            .post_model(
                "chat",
                "/chat",
                &json!({ "question": question, "context": context }),
                None,
            )
            .await;
        finish("chat", result)
    }

    async fn search_documents(&self, query: &str) -> ApiResult<Value> {
        let result = self
            .post_json("search", self.kintel("/search/"), &json!({ "query": query }), None)
            .await;
        finish("search", result)
    }

    async fn health_check(&self) -> ApiResult<String> {
        finish("health", self.health().await)
    }
}
