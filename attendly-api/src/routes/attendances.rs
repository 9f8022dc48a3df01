/// Attendance endpoints
///
/// # Endpoints
///
/// - `GET /v1/organizations/:org_id/event-dates/:id/attendances` - Answers for one event date
/// - `PUT /v1/organizations/:org_id/event-dates/:id/attendances` - Record a member's answer
/// - `GET /v1/organizations/:org_id/event-dates/:id/summary` - Per-group tallies

use super::enter_organization;
use crate::{app::AppState, error::ApiResult};
use attendly_shared::models::{Attendance, RecordAttendance};
use attendly_shared::services::EventSummary;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ListAttendancesResponse {
    pub attendances: Vec<Attendance>,
}

pub async fn list_attendances(
    State(state): State<AppState>,
    Path((org_id, event_date_id)): Path<(String, String)>,
) -> ApiResult<Json<ListAttendancesResponse>> {
    enter_organization(&state, &org_id).await?;
    let attendances = state
        .services
        .attendance
        .get_for_event(&org_id, &event_date_id)
        .await?;
    Ok(Json(ListAttendancesResponse { attendances }))
}

/// Record attendance
///
/// Answering again for the same member replaces the earlier answer.
///
/// # Endpoint
///
/// ```text
/// PUT /v1/organizations/:org_id/event-dates/:id/attendances
/// Content-Type: application/json
///
/// {
///   "memberId": "k3j9x0a1b2c4",
///   "status": "attending"
/// }
/// ```
///
/// # Errors
///
/// - `404 Not Found`: Organization or event date not found
/// - `422 Unprocessable Entity`: Unknown member
pub async fn record_attendance(
    State(state): State<AppState>,
    Path((org_id, event_date_id)): Path<(String, String)>,
    payload: Result<Json<RecordAttendance>, JsonRejection>,
) -> ApiResult<Json<Attendance>> {
    let Json(req) = payload?;
    enter_organization(&state, &org_id).await?;
    let attendance = state
        .services
        .attendance
        .record(&org_id, &event_date_id, req)
        .await?;
    Ok(Json(attendance))
}

pub async fn get_summary(
    State(state): State<AppState>,
    Path((org_id, event_date_id)): Path<(String, String)>,
) -> ApiResult<Json<EventSummary>> {
    enter_organization(&state, &org_id).await?;
    let summary = state
        .services
        .attendance
        .summarize(&org_id, &event_date_id)
        .await?;
    Ok(Json(summary))
}
