use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use guestdesk_core::{ExtractionOutcome, GuestRecord};

use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_guests).post(create_guest))
        .route("/extract", post(extract_guest))
        .route("/scan", post(scan_guest))
}

async fn list_guests(State(state): State<AppState>) -> Result<Json<Vec<GuestRecord>>, ApiError> {
    Ok(Json(state.storage.list_guests().await?))
}

/// Stores a reviewed record. The check-in is the time of this request.
async fn create_guest(
    State(state): State<AppState>,
    Json(mut guest): Json<GuestRecord>,
) -> Result<(StatusCode, Json<GuestRecord>), ApiError> {
    guest.check_in_date = Utc::now();
    let id = state.storage.add_guest(&guest).await?;

    Ok((StatusCode::CREATED, Json(guest.with_id(id))))
}

/// Extracts a record from the uploaded image without storing it.
async fn extract_guest(
    State(state): State<AppState>,
    image: Bytes,
) -> Result<Json<ExtractionOutcome>, ApiError> {
    Ok(Json(state.pipeline.extract(&image).await?))
}

/// Extracts a record from the uploaded image and stores it.
async fn scan_guest(
    State(state): State<AppState>,
    image: Bytes,
) -> Result<(StatusCode, Json<ExtractionOutcome>), ApiError> {
    let mut outcome = state.pipeline.extract(&image).await?;
    let id = state.storage.add_guest(&outcome.guest).await?;
    outcome.guest.id = Some(id);

    tracing::info!(id, route = %outcome.route, "Guest checked in from scan");
    Ok((StatusCode::CREATED, Json(outcome)))
}
