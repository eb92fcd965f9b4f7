mod error;
mod fields;
mod guard;
mod language;
mod normalizer;
mod pipeline;
mod translator;
mod vision;

pub use error::{ExtractionError, ExtractionResult, Stage};
pub use fields::FieldExtractor;
pub use guard::CallGuard;
pub use language::LanguageClassifier;
pub use normalizer::{build_prompt, GenerativeNormalizer};
pub use pipeline::{ExtractionOutcome, ExtractionPipeline};
pub use translator::{LabelRule, TranslatedField, Translator, DEFAULT_LABELS};
pub use vision::FallbackVisionExtractor;
