use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use guestdesk_core::ExtractionError;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
    pub retryable: bool,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error(transparent)]
    Storage(#[from] guestdesk_core::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Extraction(e) => match e {
                ExtractionError::EmptyInput => StatusCode::BAD_REQUEST,
                ExtractionError::NoData { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                ExtractionError::Malformed { .. } => StatusCode::BAD_GATEWAY,
                ExtractionError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
                ExtractionError::TimedOut { .. } => StatusCode::GATEWAY_TIMEOUT,
                ExtractionError::Cancelled { .. } => StatusCode::REQUEST_TIMEOUT,
            },
            Self::Storage(guestdesk_core::Error::InvalidGuest(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Extraction(e) => e.kind(),
            Self::Storage(guestdesk_core::Error::InvalidGuest(_)) => "invalid_guest",
            Self::Storage(_) => "storage",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (message, retryable) = match &self {
            Self::Extraction(e) => (e.to_string(), e.is_retryable()),
            Self::Storage(e @ guestdesk_core::Error::InvalidGuest(_)) => (e.to_string(), false),
            Self::Storage(e) => {
                tracing::error!(error = %e, "Storage error");
                ("An internal error occurred".to_string(), false)
            }
        };

        let body = ErrorBody {
            error: self.kind(),
            message,
            retryable,
        };

        (status, Json(body)).into_response()
    }
}
