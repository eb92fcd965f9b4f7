use std::time::Duration;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use super::error::{ExtractionError, ExtractionResult};
use super::fields::FieldExtractor;
use super::guard::CallGuard;
use super::language::LanguageClassifier;
use super::normalizer::GenerativeNormalizer;
use super::translator::Translator;
use super::vision::FallbackVisionExtractor;
use crate::config::Config;
use crate::guest::GuestRecord;
use crate::policy::{LanguagePolicy, Route};
use crate::providers::ProviderSet;
use crate::Result;

/// A guest record plus how it was obtained.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionOutcome {
    pub guest: GuestRecord,
    pub route: Route,
    pub language: String,
    pub processing_time_ms: u64,
}

/// Turns one photographed identity document into a [`GuestRecord`].
///
/// Structured extraction runs first. The detected language of its text then
/// decides, through the [`LanguagePolicy`], whether the record is kept,
/// translated, or discarded in favour of OCR plus a language model.
/// Exactly one branch runs; a failed branch never falls through to another.
pub struct ExtractionPipeline {
    fields: FieldExtractor,
    classifier: LanguageClassifier,
    translator: Translator,
    fallback: FallbackVisionExtractor,
    policy: LanguagePolicy,
    call_timeout: Duration,
}

impl ExtractionPipeline {
    pub fn new(providers: ProviderSet, config: &Config) -> Result<Self> {
        Self::from_providers(
            providers,
            config.language_policy.clone(),
            config.http.call_timeout(),
        )
    }

    pub fn from_providers(
        providers: ProviderSet,
        policy: LanguagePolicy,
        call_timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            fields: FieldExtractor::new(providers.documents),
            classifier: LanguageClassifier::new(providers.language),
            translator: Translator::new(providers.translation)?,
            fallback: FallbackVisionExtractor::new(
                providers.ocr,
                GenerativeNormalizer::new(providers.completion),
            ),
            policy,
            call_timeout,
        })
    }

    #[must_use]
    pub fn with_translator(mut self, translator: Translator) -> Self {
        self.translator = translator;
        self
    }

    pub fn policy(&self) -> &LanguagePolicy {
        &self.policy
    }

    pub fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    pub async fn extract(&self, image: &[u8]) -> ExtractionResult<ExtractionOutcome> {
        self.extract_with_cancel(image, CancellationToken::new()).await
    }

    /// Like [`extract`](Self::extract), but stops at the next provider call
    /// boundary once `cancel` fires.
    pub async fn extract_with_cancel(
        &self,
        image: &[u8],
        cancel: CancellationToken,
    ) -> ExtractionResult<ExtractionOutcome> {
        let run_id = Uuid::now_v7();
        let span = info_span!("extract", %run_id, bytes = image.len());

        async move {
            let start = std::time::Instant::now();
            let result = self.run(image, cancel).await;

            match &result {
                Ok((guest, route, language)) => info!(
                    route = %route,
                    language = %language,
                    known_dob = guest.has_known_date_of_birth(),
                    "Extraction finished"
                ),
                Err(e) => warn!(
                    error = %e,
                    kind = e.kind(),
                    retryable = e.is_retryable(),
                    "Extraction failed"
                ),
            }

            result.map(|(guest, route, language)| ExtractionOutcome {
                guest,
                route,
                language,
                processing_time_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            })
        }
        .instrument(span)
        .await
    }

    async fn run(
        &self,
        image: &[u8],
        cancel: CancellationToken,
    ) -> ExtractionResult<(GuestRecord, Route, String)> {
        if image.is_empty() {
            return Err(ExtractionError::EmptyInput);
        }

        let guard = CallGuard::new(self.call_timeout, cancel);

        let structured = self.fields.extract(image, &guard).await?;
        let signal = structured.content_signal();
        let language = self.classifier.classify_text(&signal, &guard).await?;
        let route = self.policy.decide(&language, &signal);

        info!(route = %route, language = %language, empty_signal = signal.is_empty(), "Routing extraction");

        let guest = match route {
            Route::Trust => structured,
            Route::Translate => self.translator.translate(&language, &structured, &guard).await?,
            Route::Fallback => self.fallback.extract(image, &guard).await?,
        };

        Ok((guest, route, language))
    }
}
