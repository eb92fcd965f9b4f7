//! Azure AI services REST clients.

mod document;
mod language;
mod openai;
mod translator;
mod vision;

pub use document::AzureDocumentIntelligence;
pub use language::{AzureLanguageDetector, UNKNOWN_LANGUAGE};
pub use openai::AzureOpenAi;
pub use translator::AzureTranslator;
pub use vision::AzureImageAnalysis;

const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
const OCTET_STREAM: &str = "application/octet-stream";

#[derive(Debug, Default, serde::Deserialize)]
struct ServiceErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl std::fmt::Display for ServiceErrorBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.code.as_deref().unwrap_or("unknown"),
            self.message.as_deref().unwrap_or("no message")
        )
    }
}
