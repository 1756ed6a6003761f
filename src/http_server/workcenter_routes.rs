//! WorkCenter HTTP Routes
//!
//! Day-based work log endpoints. The day is given as `millsecord`, epoch
//! milliseconds, either in the query string or as a form body, and mapped to
//! a calendar day in local time. Omitted means today.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Form, Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::document::{DateBucket, DocumentError};
use crate::workcenter::{EventInfo, WorkCenterService};

// ==================
// Shared State
// ==================

/// WorkCenter state shared across handlers
pub struct WorkCenterState {
    pub service: WorkCenterService,
}

impl WorkCenterState {
    pub fn new(service: WorkCenterService) -> Self {
        Self { service }
    }
}

// ==================
// Request/Response Types
// ==================

#[derive(Debug, Default, Deserialize)]
pub struct DayParams {
    #[serde(default)]
    pub millsecord: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct AddEventRequest {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub millsecord: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

// ==================
// WorkCenter Routes
// ==================

/// Create WorkCenter routes
pub fn workcenter_routes(state: Arc<WorkCenterState>) -> Router {
    Router::new()
        .route("/listByDates", get(list_by_query).post(list_by_form))
        .route("/listDateTaskCount", get(count_by_query).post(count_by_form))
        .route("/addDataTask", post(add_data_task_handler))
        .with_state(state)
}

// ==================
// Helper Functions
// ==================

fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: status.as_u16(),
        }),
    )
}

fn document_error(err: DocumentError) -> ApiError {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    tracing::warn!(error = %err, status = status.as_u16(), "work log request failed");
    api_error(status, err.to_string())
}

fn day_of(millsecord: Option<i64>) -> Result<NaiveDate, ApiError> {
    let bucket = match millsecord {
        None => DateBucket::today(),
        Some(ms) => DateBucket::from_epoch_millis(ms).ok_or_else(|| {
            api_error(
                StatusCode::BAD_REQUEST,
                format!("millsecord out of range: {}", ms),
            )
        })?,
    };
    Ok(bucket.date())
}

/// Runs blocking file I/O off the async workers
async fn blocking<T, F>(state: Arc<WorkCenterState>, op: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&WorkCenterService) -> Result<T, DocumentError> + Send + 'static,
{
    tokio::task::spawn_blocking(move || op(&state.service))
        .await
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .map_err(document_error)
}

// ==================
// Handlers
// ==================

async fn list_events(
    state: Arc<WorkCenterState>,
    params: DayParams,
) -> Result<Json<Vec<EventInfo>>, ApiError> {
    let date = day_of(params.millsecord)?;
    let events = blocking(state, move |service| service.list_events_by_date(date)).await?;
    Ok(Json(events))
}

async fn count_events(
    state: Arc<WorkCenterState>,
    params: DayParams,
) -> Result<Json<usize>, ApiError> {
    let date = day_of(params.millsecord)?;
    let count = blocking(state, move |service| service.count_events_by_date(date)).await?;
    Ok(Json(count))
}

async fn list_by_query(
    State(state): State<Arc<WorkCenterState>>,
    Query(params): Query<DayParams>,
) -> Result<Json<Vec<EventInfo>>, ApiError> {
    list_events(state, params).await
}

async fn list_by_form(
    State(state): State<Arc<WorkCenterState>>,
    Form(params): Form<DayParams>,
) -> Result<Json<Vec<EventInfo>>, ApiError> {
    list_events(state, params).await
}

async fn count_by_query(
    State(state): State<Arc<WorkCenterState>>,
    Query(params): Query<DayParams>,
) -> Result<Json<usize>, ApiError> {
    count_events(state, params).await
}

async fn count_by_form(
    State(state): State<Arc<WorkCenterState>>,
    Form(params): Form<DayParams>,
) -> Result<Json<usize>, ApiError> {
    count_events(state, params).await
}

async fn add_data_task_handler(
    State(state): State<Arc<WorkCenterState>>,
    Json(request): Json<AddEventRequest>,
) -> Result<(StatusCode, Json<EventInfo>), ApiError> {
    if request.title.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "title must not be empty"));
    }
    let date = day_of(request.millsecord)?;
    let event = EventInfo::new(request.title, request.content, date);
    let stored = blocking(state, move |service| service.add_event(event)).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_of_rejects_out_of_range() {
        let err = day_of(Some(i64::MIN)).unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_day_of_defaults_to_today() {
        assert_eq!(day_of(None).unwrap(), DateBucket::today().date());
    }

    #[test]
    fn test_add_request_defaults() {
        let request: AddEventRequest = serde_json::from_str(r#"{"title":"x"}"#).unwrap();
        assert!(request.content.is_empty());
        assert!(request.millsecord.is_none());
    }
}
