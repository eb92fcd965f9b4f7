mod azure;
mod client;
mod config;
pub mod mock;

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use azure::{
    AzureDocumentIntelligence, AzureImageAnalysis, AzureLanguageDetector, AzureOpenAi,
    AzureTranslator, UNKNOWN_LANGUAGE,
};
pub use client::ServiceClient;
pub use config::HttpConfig;

use crate::Config;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
    #[error("Operation still running after {0} polls")]
    PollExhausted(u32),
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Field name to extracted text, as returned by document analysis.
pub type DocumentFields = HashMap<String, String>;

/// One block of OCR output: its lines in reading order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBlock {
    pub lines: Vec<String>,
}

impl TextBlock {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

/// One entry of a translator response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationResult {
    #[serde(default)]
    pub translations: Vec<Translation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    pub text: String,
    #[serde(default)]
    pub to: String,
}

/// Structured field extraction from an identity document image.
#[async_trait::async_trait]
pub trait DocumentAnalysisProvider: Send + Sync {
    async fn analyze(&self, image: &[u8]) -> ProviderResult<DocumentFields>;
}

/// Raw text recognition from an image.
#[async_trait::async_trait]
pub trait OcrProvider: Send + Sync {
    async fn read_text(&self, image: &[u8]) -> ProviderResult<Vec<TextBlock>>;
}

/// Returns the ISO 639-1 code of the dominant language in `text`.
#[async_trait::async_trait]
pub trait LanguageDetector: Send + Sync {
    async fn detect(&self, text: &str) -> ProviderResult<String>;
}

/// Translates `text` from `from` into English.
#[async_trait::async_trait]
pub trait TranslationProvider: Send + Sync {
    async fn translate(&self, from: &str, text: &str) -> ProviderResult<Vec<TranslationResult>>;
}

/// Free-form text completion for a single prompt.
#[async_trait::async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, prompt: &str) -> ProviderResult<String>;
}

/// The external services one pipeline talks to.
#[derive(Clone)]
pub struct ProviderSet {
    pub documents: Arc<dyn DocumentAnalysisProvider>,
    pub ocr: Arc<dyn OcrProvider>,
    pub language: Arc<dyn LanguageDetector>,
    pub translation: Arc<dyn TranslationProvider>,
    pub completion: Arc<dyn CompletionProvider>,
}

impl ProviderSet {
    /// Azure-backed providers sharing one HTTP client.
    pub fn azure(config: &Config) -> ProviderResult<Self> {
        let client = ServiceClient::new(config.http.clone())?;

        Ok(Self {
            documents: Arc::new(AzureDocumentIntelligence::new(
                client.clone(),
                config.document_intelligence.clone(),
            )),
            ocr: Arc::new(AzureImageAnalysis::new(
                client.clone(),
                config.computer_vision.clone(),
            )),
            language: Arc::new(AzureLanguageDetector::new(
                client.clone(),
                config.text_analytics.clone(),
            )),
            translation: Arc::new(AzureTranslator::new(
                client.clone(),
                config.translator.clone(),
                config.translator_region.clone(),
            )),
            completion: Arc::new(AzureOpenAi::new(
                client,
                config.openai.clone(),
                config.openai_deployment.clone(),
            )),
        })
    }
}

impl std::fmt::Debug for ProviderSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSet").finish_non_exhaustive()
    }
}
