//! Scripted in-process [`IntakeApi`] for tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::api::IntakeApi;
use crate::result::{ApiResult, ErrorKind};
use crate::types::{Chunk, FileUpload, GeneratedQuestion, Intent, ParsedDocument};

/// One recorded call with the arguments that matter for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    ParseUrl(String),
    ProcessImage(String),
    ProcessDocument(String),
    GenerateQuestions(Vec<Chunk>),
    GenerateSummary(String),
    ClassifyIntent { query: String, context: String },
    FaqAnswer { question: String, context: String },
    Chat { question: String, context: String },
    Search(String),
    Health,
}

#[derive(Default)]
struct Script {
    parse: VecDeque<ApiResult<ParsedDocument>>,
    questions: VecDeque<ApiResult<Vec<GeneratedQuestion>>>,
    summaries: VecDeque<ApiResult<String>>,
    intents: VecDeque<ApiResult<Intent>>,
    faq: HashMap<String, VecDeque<ApiResult<String>>>,
    chats: VecDeque<ApiResult<String>>,
    calls: Vec<MockCall>,
}

/// Each operation pops the next scripted result; an empty queue answers with
/// a `Remote` failure.
#[derive(Clone, Default)]
pub struct MockApi {
    inner: Arc<Mutex<Script>>,
}

impl std::fmt::Debug for MockApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockApi").finish_non_exhaustive()
    }
}

fn unscripted<T>(operation: &str) -> ApiResult<T> {
    ApiResult::fail(ErrorKind::Remote, format!("mock: no scripted {operation} response"))
}

impl MockApi {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripted result for the next parse call (URL, image or document).
    #[must_use]
    pub fn with_parse(self, result: ApiResult<ParsedDocument>) -> Self {
        self.inner.lock().unwrap().parse.push_back(result);
        self
    }

    #[must_use]
    pub fn with_questions(self, result: ApiResult<Vec<GeneratedQuestion>>) -> Self {
        self.inner.lock().unwrap().questions.push_back(result);
        self
    }

    #[must_use]
    pub fn with_summary(self, result: ApiResult<String>) -> Self {
        self.inner.lock().unwrap().summaries.push_back(result);
        self
    }

    #[must_use]
    pub fn with_intent(self, result: ApiResult<Intent>) -> Self {
        self.inner.lock().unwrap().intents.push_back(result);
        self
    }

    /// Scripted FAQ answers for one question, consumed in order.
    #[must_use]
    pub fn with_faq_answer(self, question: &str, result: ApiResult<String>) -> Self {
        self.inner
            .lock()
            .unwrap()
            .faq
            .entry(question.to_owned())
            .or_default()
            .push_back(result);
        self
    }

    #[must_use]
    pub fn with_chat(self, result: ApiResult<String>) -> Self {
        self.inner.lock().unwrap().chats.push_back(result);
        self
    }

    #[must_use]
    pub fn calls(&self) -> Vec<MockCall> {
        self.inner.lock().unwrap().calls.clone()
    }

    /// Number of calls that reached the mock.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.inner.lock().unwrap().calls.len()
    }

    fn record(&self, call: MockCall) -> std::sync::MutexGuard<'_, Script> {
        let mut guard = self.inner.lock().unwrap();
        guard.calls.push(call);
        guard
    }
}

impl IntakeApi for MockApi {
    async fn parse_document_from_url(&self, url: &str) -> ApiResult<ParsedDocument> {
        let mut s = self.record(MockCall::ParseUrl(url.to_owned()));
        s.parse.pop_front().unwrap_or_else(|| unscripted("parse"))
    }

    async fn process_image(&self, file: &FileUpload) -> ApiResult<ParsedDocument> {
        let mut s = self.record(MockCall::ProcessImage(file.file_name.clone()));
        s.parse.pop_front().unwrap_or_else(|| unscripted("parse"))
    }

    async fn process_document(&self, file: &FileUpload) -> ApiResult<ParsedDocument> {
        let mut s = self.record(MockCall::ProcessDocument(file.file_name.clone()));
        s.parse.pop_front().unwrap_or_else(|| unscripted("parse"))
    }

    async fn generate_questions(&self, chunks: &[Chunk]) -> ApiResult<Vec<GeneratedQuestion>> {
        let mut s = self.record(MockCall::GenerateQuestions(chunks.to_vec()));
        s.questions
            .pop_front()
            .unwrap_or_else(|| unscripted("questions"))
    }

    async fn generate_summary(&self, text: &str) -> ApiResult<String> {
        let mut s = self.record(MockCall::GenerateSummary(text.to_owned()));
        s.summaries
            .pop_front()
            .unwrap_or_else(|| unscripted("summary"))
    }

    async fn classify_intent(&self, query: &str, context: &str) -> ApiResult<Intent> {
        let mut s = self.record(MockCall::ClassifyIntent {
            query: query.to_owned(),
            context: context.to_owned(),
        });
        s.intents.pop_front().unwrap_or_else(|| unscripted("intent"))
    }

    async fn faq_answer(&self, question: &str, context: &str) -> ApiResult<String> {
        let mut s = self.record(MockCall::FaqAnswer {
            question: question.to_owned(),
            context: context.to_owned(),
        });
        s.faq
            .get_mut(question)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| unscripted("faq answer"))
    }

    async fn chat(&self, question: &str, context: &str) -> ApiResult<String> {
        let mut s = self.record(MockCall::Chat {
            question: question.to_owned(),
            context: context.to_owned(),
        });
        s.chats.pop_front().unwrap_or_else(|| unscripted("chat"))
    }

    async fn search_documents(&self, query: &str) -> ApiResult<Value> {
        drop(self.record(MockCall::Search(query.to_owned())));
        ApiResult::ok(Value::Array(Vec::new()))
    }

    async fn health_check(&self) -> ApiResult<String> {
        drop(self.record(MockCall::Health));
        ApiResult::ok("OK".to_owned())
    }
}
