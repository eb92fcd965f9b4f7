use std::sync::Arc;

use super::error::{ExtractionResult, Stage};
use super::guard::CallGuard;
use crate::guest::GuestRecord;
use crate::providers::LanguageDetector;

/// Detects the language of a record's text fields.
pub struct LanguageClassifier {
    provider: Arc<dyn LanguageDetector>,
}

impl LanguageClassifier {
    pub fn new(provider: Arc<dyn LanguageDetector>) -> Self {
        Self { provider }
    }

    /// Language of the record's joined text fields.
    pub async fn classify(&self, guest: &GuestRecord, guard: &CallGuard) -> ExtractionResult<String> {
        self.classify_text(&guest.content_signal(), guard).await
    }

    /// Language of an already joined content signal, which may be empty.
    pub async fn classify_text(&self, text: &str, guard: &CallGuard) -> ExtractionResult<String> {
        let language = guard
            .run(Stage::LanguageDetection, self.provider.detect(text))
            .await?;

        tracing::debug!(language = %language, chars = text.chars().count(), "Classified record language");
        Ok(language)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::mock::MockLanguageDetector;
    use chrono::Utc;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    fn guard() -> CallGuard {
        CallGuard::new(Duration::from_secs(5), CancellationToken::new())
    }

    #[tokio::test]
    async fn test_sends_joined_text_fields() {
        let provider = Arc::new(MockLanguageDetector::detecting("ru"));
        let classifier = LanguageClassifier::new(provider.clone());
        let guest = GuestRecord::checked_in_at(Utc::now())
            .with_first_name("Иван")
            .with_last_name("Петров")
            .with_address("Москва");

        let language = classifier.classify(&guest, &guard()).await.unwrap();

        assert_eq!(language, "ru");
        assert_eq!(provider.calls.inputs(), ["Иван Петров Москва"]);
    }

    #[tokio::test]
    async fn test_empty_record_still_calls_provider() {
        let provider = Arc::new(MockLanguageDetector::detecting("(Unknown)"));
        let classifier = LanguageClassifier::new(provider.clone());

        let language = classifier
            .classify(&GuestRecord::checked_in_at(Utc::now()), &guard())
            .await
            .unwrap();

        assert_eq!(language, "(Unknown)");
        assert_eq!(provider.calls.inputs(), [""]);
    }
}
