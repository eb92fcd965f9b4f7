pub mod config;
pub mod dates;
pub mod error;
pub mod guest;
pub mod ingest;
pub mod policy;
pub mod providers;
pub mod storage;

pub use config::{Config, ProviderEndpoint};
pub use dates::{DateFormat, DATE_OF_BIRTH_FORMATS};
pub use error::{Error, Result};
pub use guest::GuestRecord;
pub use ingest::{
    CallGuard, ExtractionError, ExtractionOutcome, ExtractionPipeline, ExtractionResult,
    FallbackVisionExtractor, FieldExtractor, GenerativeNormalizer, LanguageClassifier, Stage,
    Translator,
};
pub use policy::{LanguagePolicy, Route};
pub use providers::{
    CompletionProvider, DocumentAnalysisProvider, DocumentFields, HttpConfig, LanguageDetector,
    OcrProvider, ProviderError, ProviderResult, ProviderSet, ServiceClient, TextBlock,
    Translation, TranslationProvider, TranslationResult,
};
pub use storage::Storage;
