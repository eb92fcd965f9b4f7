use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::error::{ExtractionResult, Stage};
use super::guard::CallGuard;
use crate::dates::{first_match, DATE_OF_BIRTH_FORMATS};
use crate::guest::GuestRecord;
use crate::providers::{DocumentAnalysisProvider, DocumentFields};

pub const FIRST_NAME_FIELD: &str = "FirstName";
pub const LAST_NAME_FIELD: &str = "LastName";
pub const ADDRESS_FIELD: &str = "Address";
pub const DATE_OF_BIRTH_FIELD: &str = "DateOfBirth";

/// Structured extraction through a document-analysis provider.
pub struct FieldExtractor {
    provider: Arc<dyn DocumentAnalysisProvider>,
}

impl FieldExtractor {
    pub fn new(provider: Arc<dyn DocumentAnalysisProvider>) -> Self {
        Self { provider }
    }

    pub async fn extract(&self, image: &[u8], guard: &CallGuard) -> ExtractionResult<GuestRecord> {
        let fields = guard
            .run(Stage::DocumentAnalysis, self.provider.analyze(image))
            .await?;

        Ok(map_fields(&fields, Utc::now()))
    }
}

/// Builds a fresh record from analysed fields.
///
/// Missing text fields become empty strings. The date of birth takes the
/// first layout in [`DATE_OF_BIRTH_FORMATS`] that matches, or the unknown
/// sentinel. Country is never read from structured fields.
#[must_use]
pub fn map_fields(fields: &DocumentFields, checked_in_at: DateTime<Utc>) -> GuestRecord {
    if fields.is_empty() {
        info!("No ID document data extracted");
    }

    let text = |name: &str| fields.get(name).cloned().unwrap_or_default();

    let mut guest = GuestRecord::checked_in_at(checked_in_at)
        .with_first_name(text(FIRST_NAME_FIELD))
        .with_last_name(text(LAST_NAME_FIELD))
        .with_address(text(ADDRESS_FIELD));

    if let Some(raw) = fields.get(DATE_OF_BIRTH_FIELD) {
        match first_match(raw, &DATE_OF_BIRTH_FORMATS) {
            Some((date, format)) => {
                debug!(layout = format.layout, "Parsed date of birth");
                guest = guest.with_date_of_birth(date);
            }
            None => warn!(raw = %raw, "Invalid date of birth format"),
        }
    }

    guest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::unknown_date;
    use crate::ingest::ExtractionError;
    use crate::providers::mock::{MockDocumentAnalysis, MockReply};
    use chrono::{NaiveDate, TimeZone};
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    fn fields(pairs: &[(&str, &str)]) -> DocumentFields {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_fields_copied_verbatim() {
        let guest = map_fields(
            &fields(&[
                ("FirstName", "Jane  "),
                ("LastName", "Doe"),
                ("Address", "1 Main St, Springfield"),
                ("DateOfBirth", "07/04/1980"),
                ("CountryRegion", "USA"),
            ]),
            now(),
        );

        assert_eq!(guest.first_name, "Jane  ");
        assert_eq!(guest.last_name, "Doe");
        assert_eq!(guest.address, "1 Main St, Springfield");
        assert_eq!(guest.country, "");
        assert_eq!(guest.date_of_birth, NaiveDate::from_ymd_opt(1980, 7, 4).unwrap());
        assert_eq!(guest.check_in_date, now());
        assert_eq!(guest.id, None);
    }

    #[test]
    fn test_missing_fields_are_empty() {
        let guest = map_fields(&DocumentFields::new(), now());

        assert_eq!(guest.content_signal(), "");
        assert_eq!(guest.date_of_birth, unknown_date());
    }

    #[test]
    fn test_unparseable_date_of_birth_is_unknown() {
        let guest = map_fields(&fields(&[("DateOfBirth", "1980年7月4日")]), now());

        assert_eq!(guest.date_of_birth, unknown_date());
    }

    #[test]
    fn test_short_numeric_date_is_unknown() {
        for raw in ["1/1/1", "7/4/1980", " 12/25/1985"] {
            let guest = map_fields(&fields(&[("DateOfBirth", raw)]), now());

            assert!(!guest.has_known_date_of_birth(), "{raw:?}");
        }
    }

    #[test]
    fn test_day_first_dotted_date() {
        let guest = map_fields(&fields(&[("DateOfBirth", "15.03.1972")]), now());

        assert_eq!(guest.date_of_birth, NaiveDate::from_ymd_opt(1972, 3, 15).unwrap());
    }

    #[tokio::test]
    async fn test_extract_stamps_current_time() {
        let provider = Arc::new(MockDocumentAnalysis::with_fields([("FirstName", "Jane")]));
        let extractor = FieldExtractor::new(provider.clone());
        let guard = CallGuard::new(Duration::from_secs(5), CancellationToken::new());

        let before = Utc::now();
        let guest = extractor.extract(b"image", &guard).await.unwrap();

        assert!(guest.check_in_date >= before);
        assert!(guest.check_in_date <= Utc::now());
        assert_eq!(provider.calls.count(), 1);
    }

    #[tokio::test]
    async fn test_provider_failure_is_reported() {
        let provider = Arc::new(MockDocumentAnalysis::new(MockReply::Unavailable(
            "quota exceeded".into(),
        )));
        let extractor = FieldExtractor::new(provider);
        let guard = CallGuard::new(Duration::from_secs(5), CancellationToken::new());

        let result = extractor.extract(b"image", &guard).await;

        assert!(matches!(
            result,
            Err(ExtractionError::Unavailable {
                stage: Stage::DocumentAnalysis,
                ..
            })
        ));
    }
}
