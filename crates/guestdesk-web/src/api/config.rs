use axum::{extract::State, routing::get, Json, Router};
use guestdesk_core::Route;
use serde::Serialize;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_config))
}

#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    pub translate_languages: Vec<String>,
    pub fallback_languages: Vec<String>,
    pub providers: ProviderHosts,
    pub openai_deployment: String,
    pub call_timeout_seconds: u32,
    pub max_upload_bytes: usize,
}

/// Host names only; endpoints may embed resource names and keys never leave the server.
#[derive(Debug, Serialize)]
pub struct ProviderHosts {
    pub document_intelligence: Option<String>,
    pub computer_vision: Option<String>,
    pub text_analytics: Option<String>,
    pub translator: Option<String>,
    pub openai: Option<String>,
}

async fn get_config(State(state): State<AppState>) -> Json<ConfigResponse> {
    let config = &state.config;
    let policy = &config.language_policy;

    Json(ConfigResponse {
        translate_languages: policy.languages(Route::Translate).map(String::from).collect(),
        fallback_languages: policy.languages(Route::Fallback).map(String::from).collect(),
        providers: ProviderHosts {
            document_intelligence: config.document_intelligence.host(),
            computer_vision: config.computer_vision.host(),
            text_analytics: config.text_analytics.host(),
            translator: config.translator.host(),
            openai: config.openai.host(),
        },
        openai_deployment: config.openai_deployment.clone(),
        call_timeout_seconds: config.http.call_timeout_seconds,
        max_upload_bytes: config.max_upload_bytes,
    })
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use guestdesk_core::providers::mock::{
        MockDocumentAnalysis, MockLanguageDetector, MockProviders, MockReply,
    };
    use guestdesk_core::DocumentFields;
    use tower::ServiceExt;

    use crate::api::{app, test_support};

    #[tokio::test]
    async fn test_config_hides_keys() {
        let mocks = MockProviders::new(
            MockDocumentAnalysis::new(MockReply::Value(DocumentFields::new())),
            MockLanguageDetector::detecting("en"),
        );
        let app = app(test_support::state(&mocks).await);

        let response = app
            .oneshot(Request::builder().uri("/api/config").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(!text.contains("secret-key"));

        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["translate_languages"], serde_json::json!(["ru"]));
        assert_eq!(json["fallback_languages"], serde_json::json!(["ja"]));
        assert_eq!(json["providers"]["openai"], "oai.example.com");
        assert_eq!(json["providers"]["translator"], "api.cognitive.microsofttranslator.com");
        assert_eq!(json["openai_deployment"], "gpt-35-turbo");
    }
}
