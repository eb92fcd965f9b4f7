use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;

use super::error::{ExtractionError, ExtractionResult, Stage};
use super::guard::CallGuard;
use crate::guest::GuestRecord;
use crate::providers::CompletionProvider;

const RECORD_TEMPLATE: &str = r#"{
    "FirstName": "<string>",
    "LastName": "<string>",
    "DateOfBirth": "<string>",
    "Address": "<string>",
    "Country": "<string>",
    "CheckInDate": "<string>"
}"#;

/// Instruction asking the model to turn raw document text into a guest record.
#[must_use]
pub fn build_prompt(raw_text: &str) -> String {
    format!(
        "Generate a JSON response for a guest with the following details: {raw_text}. \
         The JSON should match this structure, all values translated to english. \
         For dates, use yyyy-MM-dd:\n{RECORD_TEMPLATE}"
    )
}

/// Turns free text into a [`GuestRecord`] with a language model.
pub struct GenerativeNormalizer {
    provider: Arc<dyn CompletionProvider>,
}

impl GenerativeNormalizer {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    pub async fn normalize(&self, raw_text: &str, guard: &CallGuard) -> ExtractionResult<GuestRecord> {
        let prompt = build_prompt(raw_text);
        let completion = guard
            .run(Stage::Completion, self.provider.complete(&prompt))
            .await?;

        record_from_completion(&completion, Utc::now())
    }
}

/// Parses a completion as a guest record checked in at `checked_in_at`.
///
/// The model's own `CheckInDate` is ignored. A reply that parses but carries
/// no text and no date of birth counts as no data.
pub fn record_from_completion(
    completion: &str,
    checked_in_at: DateTime<Utc>,
) -> ExtractionResult<GuestRecord> {
    let body = strip_code_fence(completion);

    let value: Value = serde_json::from_str(body)
        .map_err(|e| ExtractionError::malformed(Stage::Completion, e.to_string()))?;
    if !value.is_object() {
        return Err(ExtractionError::malformed(
            Stage::Completion,
            "expected a JSON object",
        ));
    }

    let mut guest: GuestRecord = serde_json::from_value(value)
        .map_err(|e| ExtractionError::malformed(Stage::Completion, e.to_string()))?;

    if guest.content_signal().is_empty() && !guest.has_known_date_of_birth() {
        return Err(ExtractionError::NoData {
            stage: Stage::Completion,
        });
    }

    guest.id = None;
    guest.check_in_date = checked_in_at;
    Ok(guest)
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    debug!("Removing code fence from completion");
    // Skip an info string such as `json` on the opening line.
    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
