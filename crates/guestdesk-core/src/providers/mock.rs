//! Canned providers for tests and local runs without cloud credentials.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{
    CompletionProvider, DocumentAnalysisProvider, DocumentFields, LanguageDetector, OcrProvider,
    ProviderError, ProviderResult, ProviderSet, TextBlock, Translation, TranslationProvider,
    TranslationResult,
};

/// What a mock provider does when called.
#[derive(Debug, Clone)]
pub enum MockReply<T> {
    Value(T),
    /// Fails as if the service answered 503.
    Unavailable(String),
    /// Fails as if the service answered with an unexpected body.
    Invalid(String),
    /// Never answers.
    Hang,
}

impl<T: Clone + Send + Sync> MockReply<T> {
    async fn resolve(&self) -> ProviderResult<T> {
        match self {
            Self::Value(value) => Ok(value.clone()),
            Self::Unavailable(body) => Err(ProviderError::Status {
                status: 503,
                body: body.clone(),
            }),
            Self::Invalid(detail) => Err(ProviderError::InvalidResponse(detail.clone())),
            Self::Hang => std::future::pending().await,
        }
    }
}

/// Call counter plus the inputs each call received.
#[derive(Debug, Default)]
pub struct CallLog {
    count: AtomicUsize,
    inputs: Mutex<Vec<String>>,
}

impl CallLog {
    fn record(&self, input: impl Into<String>) {
        self.count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut inputs) = self.inputs.lock() {
            inputs.push(input.into());
        }
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    pub fn inputs(&self) -> Vec<String> {
        self.inputs.lock().map(|i| i.clone()).unwrap_or_default()
    }
}

pub struct MockDocumentAnalysis {
    reply: MockReply<DocumentFields>,
    pub calls: CallLog,
}

impl MockDocumentAnalysis {
    pub fn new(reply: MockReply<DocumentFields>) -> Self {
        Self {
            reply,
            calls: CallLog::default(),
        }
    }

    pub fn with_fields<'a>(fields: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self::new(MockReply::Value(
            fields
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        ))
    }
}

#[async_trait]
impl DocumentAnalysisProvider for MockDocumentAnalysis {
    async fn analyze(&self, image: &[u8]) -> ProviderResult<DocumentFields> {
        self.calls.record(format!("{} bytes", image.len()));
        self.reply.resolve().await
    }
}

pub struct MockOcr {
    reply: MockReply<Vec<TextBlock>>,
    pub calls: CallLog,
}

impl MockOcr {
    pub fn new(reply: MockReply<Vec<TextBlock>>) -> Self {
        Self {
            reply,
            calls: CallLog::default(),
        }
    }

    pub fn with_blocks(blocks: Vec<TextBlock>) -> Self {
        Self::new(MockReply::Value(blocks))
    }
}

#[async_trait]
impl OcrProvider for MockOcr {
    async fn read_text(&self, image: &[u8]) -> ProviderResult<Vec<TextBlock>> {
        self.calls.record(format!("{} bytes", image.len()));
        self.reply.resolve().await
    }
}

pub struct MockLanguageDetector {
    reply: MockReply<String>,
    pub calls: CallLog,
}

impl MockLanguageDetector {
    pub fn new(reply: MockReply<String>) -> Self {
        Self {
            reply,
            calls: CallLog::default(),
        }
    }

    pub fn detecting(language: &str) -> Self {
        Self::new(MockReply::Value(language.to_string()))
    }
}

#[async_trait]
impl LanguageDetector for MockLanguageDetector {
    async fn detect(&self, text: &str) -> ProviderResult<String> {
        self.calls.record(text);
        self.reply.resolve().await
    }
}

pub struct MockTranslator {
    reply: MockReply<Vec<TranslationResult>>,
    pub calls: CallLog,
}

impl MockTranslator {
    pub fn new(reply: MockReply<Vec<TranslationResult>>) -> Self {
        Self {
            reply,
            calls: CallLog::default(),
        }
    }

    /// Replies with a single English translation whose text is `text`.
    pub fn returning(text: &str) -> Self {
        Self::new(MockReply::Value(vec![TranslationResult {
            translations: vec![Translation {
                text: text.to_string(),
                to: "en".to_string(),
            }],
        }]))
    }
}

#[async_trait]
impl TranslationProvider for MockTranslator {
    async fn translate(&self, from: &str, text: &str) -> ProviderResult<Vec<TranslationResult>> {
        self.calls.record(format!("{from}:{text}"));
        self.reply.resolve().await
    }
}

pub struct MockCompletion {
    reply: MockReply<String>,
    pub calls: CallLog,
}

impl MockCompletion {
    pub fn new(reply: MockReply<String>) -> Self {
        Self {
            reply,
            calls: CallLog::default(),
        }
    }

    pub fn returning(text: &str) -> Self {
        Self::new(MockReply::Value(text.to_string()))
    }
}

#[async_trait]
impl CompletionProvider for MockCompletion {
    async fn complete(&self, prompt: &str) -> ProviderResult<String> {
        self.calls.record(prompt);
        self.reply.resolve().await
    }
}

/// A full set of mocks, kept by concrete type so tests can inspect calls.
pub struct MockProviders {
    pub documents: Arc<MockDocumentAnalysis>,
    pub ocr: Arc<MockOcr>,
    pub language: Arc<MockLanguageDetector>,
    pub translation: Arc<MockTranslator>,
    pub completion: Arc<MockCompletion>,
}

impl MockProviders {
    /// OCR, translation and completion answer with empty data until replaced.
    pub fn new(documents: MockDocumentAnalysis, language: MockLanguageDetector) -> Self {
        Self {
            documents: Arc::new(documents),
            ocr: Arc::new(MockOcr::with_blocks(Vec::new())),
            language: Arc::new(language),
            translation: Arc::new(MockTranslator::new(MockReply::Value(Vec::new()))),
            completion: Arc::new(MockCompletion::returning("{}")),
        }
    }

    #[must_use]
    pub fn with_ocr(mut self, ocr: MockOcr) -> Self {
        self.ocr = Arc::new(ocr);
        self
    }

    #[must_use]
    pub fn with_translator(mut self, translation: MockTranslator) -> Self {
        self.translation = Arc::new(translation);
        self
    }

    #[must_use]
    pub fn with_completion(mut self, completion: MockCompletion) -> Self {
        self.completion = Arc::new(completion);
        self
    }

    pub fn provider_set(&self) -> ProviderSet {
        ProviderSet {
            documents: self.documents.clone(),
            ocr: self.ocr.clone(),
            language: self.language.clone(),
            translation: self.translation.clone(),
            completion: self.completion.clone(),
        }
    }
}
