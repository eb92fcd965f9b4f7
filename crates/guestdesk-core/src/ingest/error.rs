use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::providers::ProviderError;

/// The external call a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    DocumentAnalysis,
    LanguageDetection,
    Translation,
    Ocr,
    Completion,
}

impl Stage {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DocumentAnalysis => "document_analysis",
            Self::LanguageDetection => "language_detection",
            Self::Translation => "translation",
            Self::Ocr => "ocr",
            Self::Completion => "completion",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Uploaded file is empty")]
    EmptyInput,
    #[error("{stage} unavailable: {source}")]
    Unavailable {
        stage: Stage,
        #[source]
        source: ProviderError,
    },
    #[error("{stage} returned a malformed response: {detail}")]
    Malformed { stage: Stage, detail: String },
    #[error("{stage} extracted no data")]
    NoData { stage: Stage },
    #[error("{stage} timed out after {after:?}")]
    TimedOut { stage: Stage, after: Duration },
    #[error("{stage} cancelled")]
    Cancelled { stage: Stage },
}

pub type ExtractionResult<T> = Result<T, ExtractionError>;

impl ExtractionError {
    /// Classifies a provider failure: a bad body is malformed, anything else
    /// means the service could not be used.
    #[must_use]
    pub fn from_provider(stage: Stage, error: ProviderError) -> Self {
        match error {
            ProviderError::InvalidResponse(detail) => Self::Malformed { stage, detail },
            source => Self::Unavailable { stage, source },
        }
    }

    pub fn malformed(stage: Stage, detail: impl Into<String>) -> Self {
        Self::Malformed {
            stage,
            detail: detail.into(),
        }
    }

    #[must_use]
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::EmptyInput => None,
            Self::Unavailable { stage, .. }
            | Self::Malformed { stage, .. }
            | Self::NoData { stage }
            | Self::TimedOut { stage, .. }
            | Self::Cancelled { stage } => Some(*stage),
        }
    }

    /// Whether trying the same upload again could succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable { .. } | Self::TimedOut { .. })
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmptyInput => "empty_input",
            Self::Unavailable { .. } => "unavailable",
            Self::Malformed { .. } => "malformed",
            Self::NoData { .. } => "no_data",
            Self::TimedOut { .. } => "timed_out",
            Self::Cancelled { .. } => "cancelled",
        }
    }
}
