use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::ProviderEndpoint;
use crate::providers::{CompletionProvider, ProviderError, ProviderResult, ServiceClient};

const API_VERSION: &str = "2024-02-15-preview";
const API_KEY_HEADER: &str = "api-key";

/// Azure OpenAI chat completions against one deployment.
pub struct AzureOpenAi {
    client: ServiceClient,
    endpoint: ProviderEndpoint,
    deployment: String,
}

impl AzureOpenAi {
    pub fn new(client: ServiceClient, endpoint: ProviderEndpoint, deployment: String) -> Self {
        Self {
            client,
            endpoint,
            deployment,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl CompletionProvider for AzureOpenAi {
    async fn complete(&self, prompt: &str) -> ProviderResult<String> {
        let url = format!(
            "{}/openai/deployments/{}/chat/completions?api-version={API_VERSION}",
            self.endpoint.base_url(),
            self.deployment
        );

        let body = ChatRequest {
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        tracing::debug!(deployment = %self.deployment, "Sending completion request");

        let request = self
            .client
            .post(&url)?
            .header(API_KEY_HEADER, &self.endpoint.api_key)
            .json(&body);

        let response: ChatResponse = self.client.send_json(request).await?;
        content_from_response(response)
    }
}

fn content_from_response(response: ChatResponse) -> ProviderResult<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| ProviderError::InvalidResponse("completion has no content".to_string()))
}
