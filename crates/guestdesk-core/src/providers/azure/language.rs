use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{ServiceErrorBody, SUBSCRIPTION_KEY_HEADER};
use crate::config::ProviderEndpoint;
use crate::providers::{LanguageDetector, ProviderError, ProviderResult, ServiceClient};

const API_VERSION: &str = "2023-04-01";

/// Code reported by the service when it cannot tell the language.
pub const UNKNOWN_LANGUAGE: &str = "(Unknown)";

/// Azure AI Language, language detection task.
pub struct AzureLanguageDetector {
    client: ServiceClient,
    endpoint: ProviderEndpoint,
}

impl AzureLanguageDetector {
    pub fn new(client: ServiceClient, endpoint: ProviderEndpoint) -> Self {
        Self { client, endpoint }
    }
}

#[async_trait]
impl LanguageDetector for AzureLanguageDetector {
    async fn detect(&self, text: &str) -> ProviderResult<String> {
        // The service rejects empty documents outright.
        if text.trim().is_empty() {
            return Ok(UNKNOWN_LANGUAGE.to_string());
        }

        let url = format!(
            "{}/language/:analyze-text?api-version={API_VERSION}",
            self.endpoint.base_url()
        );

        let body = json!({
            "kind": "LanguageDetection",
            "analysisInput": {
                "documents": [{ "id": "1", "text": text }]
            }
        });

        let request = self
            .client
            .post(&url)?
            .header(SUBSCRIPTION_KEY_HEADER, &self.endpoint.api_key)
            .json(&body);

        let response: AnalyzeTextResponse = self.client.send_json(request).await?;
        language_from_response(response)
    }
}

#[derive(Debug, Deserialize)]
struct AnalyzeTextResponse {
    results: DetectionResults,
}

#[derive(Debug, Deserialize)]
struct DetectionResults {
    #[serde(default)]
    documents: Vec<DetectedDocument>,
    #[serde(default)]
    errors: Vec<DocumentError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetectedDocument {
    detected_language: DetectedLanguage,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetectedLanguage {
    iso6391_name: String,
    #[serde(default)]
    confidence_score: f64,
}

#[derive(Debug, Deserialize)]
struct DocumentError {
    error: ServiceErrorBody,
}

fn language_from_response(response: AnalyzeTextResponse) -> ProviderResult<String> {
    if let Some(doc) = response.results.documents.into_iter().next() {
        tracing::debug!(
            language = %doc.detected_language.iso6391_name,
            confidence = doc.detected_language.confidence_score,
            "Detected language"
        );
        return Ok(doc.detected_language.iso6391_name);
    }

    let reason = response
        .results
        .errors
        .into_iter()
        .next()
        .map_or_else(|| "no documents in response".to_string(), |e| e.error.to_string());

    Err(ProviderError::InvalidResponse(reason))
}
