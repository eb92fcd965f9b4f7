use std::sync::Arc;

use chrono::{DateTime, Utc};
use regex::Regex;
use tracing::debug;

use super::error::{ExtractionError, ExtractionResult, Stage};
use super::guard::CallGuard;
use crate::guest::GuestRecord;
use crate::providers::{TranslationProvider, TranslationResult};

/// Text field a [`LabelRule`] applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslatedField {
    FirstName,
    LastName,
}

impl TranslatedField {
    fn value_mut(self, guest: &mut GuestRecord) -> &mut String {
        match self {
            Self::FirstName => &mut guest.first_name,
            Self::LastName => &mut guest.last_name,
        }
    }
}

/// A field label the translator leaks into a value, removed after translation.
#[derive(Debug, Clone)]
pub struct LabelRule {
    pub field: TranslatedField,
    pub label: String,
    regex: Regex,
}

impl LabelRule {
    pub fn new(field: TranslatedField, label: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("(?i){}", regex::escape(label)))?;
        Ok(Self {
            field,
            label: label.to_string(),
            regex,
        })
    }

    /// Removes every occurrence of the label, then trims.
    fn apply(&self, guest: &mut GuestRecord) {
        let value = self.field.value_mut(guest);
        if !self.regex.is_match(value) {
            return;
        }

        let stripped = self.regex.replace_all(value, "").trim().to_string();
        debug!(label = %self.label, from = %value, to = %stripped, "Stripped leaked label");
        *value = stripped;
    }
}

/// Labels the translator is known to leak into values.
pub const DEFAULT_LABELS: [(TranslatedField, &str); 2] = [
    (TranslatedField::FirstName, "Patronymic"),
    (TranslatedField::LastName, "Name"),
];

/// Translates a structured record to English through a translation provider.
pub struct Translator {
    provider: Arc<dyn TranslationProvider>,
    rules: Vec<LabelRule>,
}

impl Translator {
    /// A translator with the [`DEFAULT_LABELS`] rules.
    pub fn new(provider: Arc<dyn TranslationProvider>) -> Result<Self, regex::Error> {
        let rules = DEFAULT_LABELS
            .iter()
            .map(|(field, label)| LabelRule::new(*field, label))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { provider, rules })
    }

    #[must_use]
    pub fn with_label_rule(mut self, rule: LabelRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn label_rules(&self) -> &[LabelRule] {
        &self.rules
    }

    /// Sends the record as JSON from `language` to English and parses the reply.
    pub async fn translate(
        &self,
        language: &str,
        guest: &GuestRecord,
        guard: &CallGuard,
    ) -> ExtractionResult<GuestRecord> {
        let payload = guest
            .to_json()
            .map_err(|e| ExtractionError::malformed(Stage::Translation, e.to_string()))?;

        let results = guard
            .run(Stage::Translation, self.provider.translate(language, &payload))
            .await?;

        self.record_from_translation(&results, guest.check_in_date)
    }

    /// Reads the first translation of the first result as a fresh record.
    pub fn record_from_translation(
        &self,
        results: &[TranslationResult],
        checked_in_at: DateTime<Utc>,
    ) -> ExtractionResult<GuestRecord> {
        let text = results
            .first()
            .and_then(|r| r.translations.first())
            .map(|t| t.text.as_str())
            .ok_or_else(|| ExtractionError::malformed(Stage::Translation, "no translation returned"))?;

        if text.trim().is_empty() {
            return Err(ExtractionError::NoData {
                stage: Stage::Translation,
            });
        }

        let mut guest = GuestRecord::from_json(text)
            .map_err(|e| ExtractionError::malformed(Stage::Translation, e.to_string()))?;

        for rule in &self.rules {
            rule.apply(&mut guest);
        }

        guest.id = None;
        guest.check_in_date = checked_in_at;
        Ok(guest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::mock::{MockReply, MockTranslator};
    use crate::providers::Translation;
    use chrono::{NaiveDate, TimeZone};
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    fn guard() -> CallGuard {
        CallGuard::new(Duration::from_secs(5), CancellationToken::new())
    }

    fn checked_in() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 2, 18, 45, 0).unwrap()
    }

    fn reply(text: &str) -> Vec<TranslationResult> {
        vec![TranslationResult {
            translations: vec![Translation {
                text: text.to_string(),
                to: "en".to_string(),
            }],
        }]
    }

    fn translator() -> Translator {
        Translator::new(Arc::new(MockTranslator::returning(""))).unwrap()
    }

    #[test]
    fn test_strips_leaked_labels() {
        let guest = translator()
            .record_from_translation(
                &reply(r#"{"FirstName": "PatronymicIvan", "LastName": "NameSmith"}"#),
                checked_in(),
            )
            .unwrap();

        assert_eq!(guest.first_name, "Ivan");
        assert_eq!(guest.last_name, "Smith");
    }

    #[test]
    fn test_label_match_ignores_case_and_trims() {
        let guest = translator()
            .record_from_translation(
                &reply(r#"{"FirstName": "patronymic  Ivan ", "LastName": "Petrov NAME"}"#),
                checked_in(),
            )
            .unwrap();

        assert_eq!(guest.first_name, "Ivan");
        assert_eq!(guest.last_name, "Petrov");
    }

    #[test]
    fn test_labels_apply_only_to_their_field() {
        let guest = translator()
            .record_from_translation(
                &reply(r#"{"FirstName": "Namely", "Address": "Patronymic Street 5"}"#),
                checked_in(),
            )
            .unwrap();

        assert_eq!(guest.first_name, "Namely");
        assert_eq!(guest.address, "Patronymic Street 5");
    }

    #[test]
    fn test_stamps_source_check_in() {
        let guest = translator()
            .record_from_translation(
                &reply(r#"{"FirstName": "Ivan", "DateOfBirth": "1985-02-11", "CheckInDate": "1999-01-01", "Id": 4}"#),
                checked_in(),
            )
            .unwrap();

        assert_eq!(guest.check_in_date, checked_in());
        assert_eq!(guest.date_of_birth, NaiveDate::from_ymd_opt(1985, 2, 11).unwrap());
        assert_eq!(guest.id, None);
    }

    #[test]
    fn test_missing_translation_is_malformed() {
        let result = translator().record_from_translation(&[], checked_in());
        assert!(matches!(result, Err(ExtractionError::Malformed { stage: Stage::Translation, .. })));

        let empty = vec![TranslationResult {
            translations: Vec::new(),
        }];
        let result = translator().record_from_translation(&empty, checked_in());
        assert!(matches!(result, Err(ExtractionError::Malformed { .. })));
    }

    #[test]
    fn test_empty_translation_is_no_data() {
        let result = translator().record_from_translation(&reply("  "), checked_in());

        assert!(matches!(result, Err(ExtractionError::NoData { stage: Stage::Translation })));
    }

    #[test]
    fn test_non_json_translation_is_malformed() {
        let result = translator().record_from_translation(&reply("Ivan Petrov"), checked_in());

        assert!(matches!(result, Err(ExtractionError::Malformed { .. })));
    }

    #[test]
    fn test_default_rules_are_all_built() {
        let rules = translator();
        let labels: Vec<_> = rules
            .label_rules()
            .iter()
            .map(|rule| (rule.field, rule.label.as_str()))
            .collect();

        assert_eq!(labels, DEFAULT_LABELS);
    }

    #[test]
    fn test_custom_label_rule() {
        let rule = LabelRule::new(TranslatedField::FirstName, "Given name").unwrap();
        let translator = translator().with_label_rule(rule);

        let guest = translator
            .record_from_translation(&reply(r#"{"FirstName": "Given name: Olga"}"#), checked_in())
            .unwrap();

        assert_eq!(guest.first_name, ": Olga");
        assert_eq!(translator.label_rules().len(), 3);
    }

    #[tokio::test]
    async fn test_translate_sends_record_json() {
        let provider = Arc::new(MockTranslator::returning(
            r#"{"FirstName": "Ivan", "LastName": "Petrov", "Country": "Russia"}"#,
        ));
        let translator = Translator::new(provider.clone()).unwrap();
        let source = GuestRecord::checked_in_at(checked_in())
            .with_first_name("Иван")
            .with_last_name("Петров");

        let guest = translator.translate("ru", &source, &guard()).await.unwrap();

        assert_eq!(guest.first_name, "Ivan");
        assert_eq!(guest.country, "Russia");
        assert_eq!(guest.check_in_date, checked_in());

        let inputs = provider.calls.inputs();
        assert_eq!(inputs.len(), 1);
        assert!(inputs[0].starts_with("ru:{"));
        assert!(inputs[0].contains("\"FirstName\": \"Иван\""));
    }

    #[tokio::test]
    async fn test_translate_provider_failure() {
        let provider = Arc::new(MockTranslator::new(MockReply::Unavailable("throttled".into())));
        let translator = Translator::new(provider).unwrap();
        let source = GuestRecord::checked_in_at(checked_in()).with_first_name("Иван");

        let result = translator.translate("ru", &source, &guard()).await;

        assert!(matches!(result, Err(ExtractionError::Unavailable { stage: Stage::Translation, .. })));
    }
}
