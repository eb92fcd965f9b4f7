use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;

use super::{OCTET_STREAM, SUBSCRIPTION_KEY_HEADER};
use crate::config::ProviderEndpoint;
use crate::providers::{OcrProvider, ProviderResult, ServiceClient, TextBlock};

const API_VERSION: &str = "2023-10-01";

/// Image Analysis 4.0 with the `read` feature.
pub struct AzureImageAnalysis {
    client: ServiceClient,
    endpoint: ProviderEndpoint,
}

impl AzureImageAnalysis {
    pub fn new(client: ServiceClient, endpoint: ProviderEndpoint) -> Self {
        Self { client, endpoint }
    }
}

#[async_trait]
impl OcrProvider for AzureImageAnalysis {
    async fn read_text(&self, image: &[u8]) -> ProviderResult<Vec<TextBlock>> {
        let url = format!(
            "{}/computervision/imageanalysis:analyze?api-version={API_VERSION}&features=read",
            self.endpoint.base_url()
        );

        let request = self
            .client
            .post(&url)?
            .header(SUBSCRIPTION_KEY_HEADER, &self.endpoint.api_key)
            .header(CONTENT_TYPE, OCTET_STREAM)
            .body(image.to_vec());

        let response: ImageAnalysisResponse = self.client.send_json(request).await?;
        Ok(blocks_from_response(response))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageAnalysisResponse {
    #[serde(default)]
    read_result: Option<ReadResult>,
}

#[derive(Debug, Deserialize)]
struct ReadResult {
    #[serde(default)]
    blocks: Vec<ReadBlock>,
}

#[derive(Debug, Deserialize)]
struct ReadBlock {
    #[serde(default)]
    lines: Vec<ReadLine>,
}

#[derive(Debug, Deserialize)]
struct ReadLine {
    text: String,
}

fn blocks_from_response(response: ImageAnalysisResponse) -> Vec<TextBlock> {
    response
        .read_result
        .map(|r| r.blocks)
        .unwrap_or_default()
        .into_iter()
        .map(|block| TextBlock::new(block.lines.into_iter().map(|l| l.text)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::client::parse_body;

    #[test]
    fn test_blocks_keep_reading_order() {
        let response: ImageAnalysisResponse = parse_body(
            r#"{
                "modelVersion": "2023-10-01",
                "readResult": {
                    "blocks": [
                        {"lines": [{"text": "PASSPORT", "words": []}, {"text": "JAPAN"}]},
                        {"lines": [{"text": "YAMADA"}]}
                    ]
                }
            }"#,
        )
        .unwrap();

        let blocks = blocks_from_response(response);

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].lines, ["PASSPORT", "JAPAN"]);
        assert_eq!(blocks[1].lines, ["YAMADA"]);
    }

    #[test]
    fn test_missing_read_result() {
        let response: ImageAnalysisResponse = parse_body(r#"{"modelVersion": "2023-10-01"}"#).unwrap();

        assert!(blocks_from_response(response).is_empty());
    }
}
