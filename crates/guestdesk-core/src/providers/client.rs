use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;

use super::config::HttpConfig;
use super::{ProviderError, ProviderResult};
use crate::config::is_local_host;

/// HTTP client shared by the cloud providers.
///
/// Refuses plain-http targets other than localhost, and turns non-success
/// statuses into [`ProviderError::Status`].
#[derive(Clone)]
pub struct ServiceClient {
    config: HttpConfig,
    inner: Client,
}

impl ServiceClient {
    pub fn new(config: HttpConfig) -> ProviderResult<Self> {
        let inner = Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.call_timeout())
            .user_agent(config.user_agent())
            .build()?;

        Ok(Self { config, inner })
    }

    fn validate_request(url: &str) -> ProviderResult<()> {
        let parsed = Url::parse(url)?;

        let host = parsed
            .host_str()
            .ok_or_else(|| ProviderError::InvalidEndpoint("No host in URL".to_string()))?;

        match parsed.scheme() {
            "https" => Ok(()),
            "http" if is_local_host(host) => Ok(()),
            scheme => Err(ProviderError::InvalidEndpoint(format!(
                "{scheme} is not allowed for {host}"
            ))),
        }
    }

    pub fn request(&self, method: Method, url: &str) -> ProviderResult<RequestBuilder> {
        Self::validate_request(url)?;
        Ok(self.inner.request(method, url))
    }

    pub fn get(&self, url: &str) -> ProviderResult<RequestBuilder> {
        self.request(Method::GET, url)
    }

    pub fn post(&self, url: &str) -> ProviderResult<RequestBuilder> {
        self.request(Method::POST, url)
    }

    /// Sends the request and fails on any non-2xx status.
    pub async fn send(&self, request: RequestBuilder) -> ProviderResult<Response> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), "Provider returned error status");
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    /// Sends the request and decodes a JSON body.
    pub async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> ProviderResult<T> {
        let body = self.send(request).await?.text().await?;
        parse_body(&body)
    }

    pub fn config(&self) -> &HttpConfig {
        &self.config
    }
}

pub(crate) fn parse_body<T: DeserializeOwned>(body: &str) -> ProviderResult<T> {
    serde_json::from_str(body).map_err(|e| ProviderError::InvalidResponse(e.to_string()))
}
