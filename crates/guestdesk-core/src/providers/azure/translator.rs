use async_trait::async_trait;
use serde::Serialize;

use super::SUBSCRIPTION_KEY_HEADER;
use crate::config::ProviderEndpoint;
use crate::providers::{ProviderResult, ServiceClient, TranslationProvider, TranslationResult};

const API_VERSION: &str = "3.0";
const TARGET_LANGUAGE: &str = "en";
const REGION_HEADER: &str = "Ocp-Apim-Subscription-Region";

/// Azure AI Translator v3, always translating into English.
pub struct AzureTranslator {
    client: ServiceClient,
    endpoint: ProviderEndpoint,
    region: String,
}

impl AzureTranslator {
    pub fn new(client: ServiceClient, endpoint: ProviderEndpoint, region: String) -> Self {
        Self {
            client,
            endpoint,
            region,
        }
    }
}

#[derive(Debug, Serialize)]
struct TranslateItem<'a> {
    #[serde(rename = "Text")]
    text: &'a str,
}

#[async_trait]
impl TranslationProvider for AzureTranslator {
    async fn translate(&self, from: &str, text: &str) -> ProviderResult<Vec<TranslationResult>> {
        let url = format!("{}/translate", self.endpoint.base_url());

        let request = self
            .client
            .post(&url)?
            .query(&[
                ("api-version", API_VERSION),
                ("from", from),
                ("to", TARGET_LANGUAGE),
            ])
            .header(SUBSCRIPTION_KEY_HEADER, &self.endpoint.api_key)
            .header(REGION_HEADER, &self.region)
            .json(&[TranslateItem { text }]);

        self.client.send_json(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::client::parse_body;

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value([TranslateItem { text: "Иван" }]).unwrap();

        assert_eq!(body, serde_json::json!([{"Text": "Иван"}]));
    }

    #[test]
    fn test_response_shape() {
        let results: Vec<TranslationResult> = parse_body(
            r#"[{"detectedLanguage": {"language": "ru", "score": 1.0},
                 "translations": [{"text": "Ivan", "to": "en"}]}]"#,
        )
        .unwrap();

        assert_eq!(results[0].translations[0].text, "Ivan");
        assert_eq!(results[0].translations[0].to, "en");
    }
}
