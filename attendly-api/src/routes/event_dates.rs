/// Event date endpoints
///
/// # Endpoints
///
/// - `GET /v1/organizations/:org_id/event-dates` - List event dates by date
/// - `POST /v1/organizations/:org_id/event-dates` - Create event date
/// - `GET /v1/organizations/:org_id/event-dates/:id` - Get event date
/// - `PATCH /v1/organizations/:org_id/event-dates/:id` - Update event date
/// - `DELETE /v1/organizations/:org_id/event-dates/:id` - Delete event date and its answers

use super::{enter_organization, DeletedResponse};
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use attendly_shared::models::{CreateEventDate, EventDate, UpdateEventDate};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEventDatesResponse {
    pub event_dates: Vec<EventDate>,
}

pub async fn list_event_dates(
    State(state): State<AppState>,
    Path(org_id): Path<String>,
) -> ApiResult<Json<ListEventDatesResponse>> {
    enter_organization(&state, &org_id).await?;
    let mut event_dates = state.services.event_dates.get_all(&org_id).await?;
    event_dates.sort_by(|a, b| a.date.cmp(&b.date));
    Ok(Json(ListEventDatesResponse { event_dates }))
}

/// Create event date
///
/// # Endpoint
///
/// ```text
/// POST /v1/organizations/:org_id/event-dates
/// Content-Type: application/json
///
/// {
///   "date": "2025-06-01",
///   "title": "Rehearsal",
///   "location": "Hall B"
/// }
/// ```
pub async fn create_event_date(
    State(state): State<AppState>,
    Path(org_id): Path<String>,
    payload: Result<Json<CreateEventDate>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<EventDate>)> {
    let Json(req) = payload?;
    enter_organization(&state, &org_id).await?;
    let event_date = state.services.event_dates.create(&org_id, req).await?;
    Ok((StatusCode::CREATED, Json(event_date)))
}

pub async fn get_event_date(
    State(state): State<AppState>,
    Path((org_id, id)): Path<(String, String)>,
) -> ApiResult<Json<EventDate>> {
    enter_organization(&state, &org_id).await?;
    state
        .services
        .event_dates
        .get_by_id(&org_id, &id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("event date not found: {}", id)))
}

pub async fn update_event_date(
    State(state): State<AppState>,
    Path((org_id, id)): Path<(String, String)>,
    payload: Result<Json<UpdateEventDate>, JsonRejection>,
) -> ApiResult<Json<EventDate>> {
    let Json(req) = payload?;
    enter_organization(&state, &org_id).await?;
    let event_date = state.services.event_dates.update(&org_id, &id, req).await?;
    Ok(Json(event_date))
}

pub async fn delete_event_date(
    State(state): State<AppState>,
    Path((org_id, id)): Path<(String, String)>,
) -> ApiResult<Json<DeletedResponse>> {
    enter_organization(&state, &org_id).await?;
    state.services.event_dates.delete(&org_id, &id).await?;
    Ok(Json(DeletedResponse { deleted: true }))
}
