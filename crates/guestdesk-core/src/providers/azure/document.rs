use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use tracing::{debug, info};

use super::{ServiceErrorBody, OCTET_STREAM, SUBSCRIPTION_KEY_HEADER};
use crate::config::ProviderEndpoint;
use crate::providers::{
    DocumentAnalysisProvider, DocumentFields, ProviderError, ProviderResult, ServiceClient,
};

const API_VERSION: &str = "2023-07-31";
const ID_DOCUMENT_MODEL: &str = "prebuilt-idDocument";
const OPERATION_LOCATION: &str = "operation-location";

/// Document Intelligence with the prebuilt identity-document model.
///
/// Analysis is a long-running operation: the image is submitted, then the
/// returned operation URL is polled until it settles.
pub struct AzureDocumentIntelligence {
    client: ServiceClient,
    endpoint: ProviderEndpoint,
    model: String,
}

impl AzureDocumentIntelligence {
    pub fn new(client: ServiceClient, endpoint: ProviderEndpoint) -> Self {
        Self {
            client,
            endpoint,
            model: ID_DOCUMENT_MODEL.to_string(),
        }
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn analyze_url(&self) -> String {
        format!(
            "{}/formrecognizer/documentModels/{}:analyze?api-version={API_VERSION}",
            self.endpoint.base_url(),
            self.model
        )
    }

    async fn submit(&self, image: &[u8]) -> ProviderResult<String> {
        let request = self
            .client
            .post(&self.analyze_url())?
            .header(SUBSCRIPTION_KEY_HEADER, &self.endpoint.api_key)
            .header(CONTENT_TYPE, OCTET_STREAM)
            .body(image.to_vec());

        let response = self.client.send(request).await?;

        response
            .headers()
            .get(OPERATION_LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
            .ok_or_else(|| {
                ProviderError::InvalidResponse("missing Operation-Location header".to_string())
            })
    }

    async fn poll(&self, operation_url: &str) -> ProviderResult<AnalyzeOperation> {
        let max_polls = self.client.config().max_polls;
        let interval = self.client.config().poll_interval();

        for attempt in 1..=max_polls {
            let request = self
                .client
                .get(operation_url)?
                .header(SUBSCRIPTION_KEY_HEADER, &self.endpoint.api_key);

            let operation: AnalyzeOperation = self.client.send_json(request).await?;

            match operation.status.as_str() {
                "succeeded" | "failed" | "canceled" => return Ok(operation),
                status => {
                    debug!(attempt, status, "Document analysis still running");
                    tokio::time::sleep(interval).await;
                }
            }
        }

        Err(ProviderError::PollExhausted(max_polls))
    }
}

#[async_trait]
impl DocumentAnalysisProvider for AzureDocumentIntelligence {
    async fn analyze(&self, image: &[u8]) -> ProviderResult<DocumentFields> {
        let operation_url = self.submit(image).await?;
        let operation = self.poll(&operation_url).await?;
        fields_from_operation(operation)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeOperation {
    status: String,
    #[serde(default)]
    analyze_result: Option<AnalyzeResult>,
    #[serde(default)]
    error: Option<ServiceErrorBody>,
}

#[derive(Debug, Default, Deserialize)]
struct AnalyzeResult {
    #[serde(default)]
    documents: Vec<AnalyzedDocument>,
}

#[derive(Debug, Default, Deserialize)]
struct AnalyzedDocument {
    #[serde(default)]
    fields: HashMap<String, Option<DocumentField>>,
}

#[derive(Debug, Deserialize)]
struct DocumentField {
    #[serde(default)]
    content: Option<String>,
}

fn fields_from_operation(operation: AnalyzeOperation) -> ProviderResult<DocumentFields> {
    if operation.status != "succeeded" {
        let reason = operation.error.unwrap_or_default();
        return Err(ProviderError::InvalidResponse(format!(
            "analysis {}: {reason}",
            operation.status
        )));
    }

    let Some(document) = operation
        .analyze_result
        .and_then(|r| r.documents.into_iter().next())
    else {
        info!("No ID document data extracted");
        return Ok(DocumentFields::new());
    };

    let fields: DocumentFields = document
        .fields
        .into_iter()
        .filter_map(|(name, field)| field.and_then(|f| f.content).map(|content| (name, content)))
        .collect();

    debug!(
        fields = ?fields.keys().collect::<Vec<_>>(),
        "Fields identified in the document"
    );

    Ok(fields)
}
