/// Organization endpoints
///
/// # Endpoints
///
/// - `GET /v1/organizations` - List organizations, newest first
/// - `POST /v1/organizations` - Create organization
/// - `GET /v1/organizations/:org_id` - Get organization
/// - `PATCH /v1/organizations/:org_id` - Update organization
/// - `DELETE /v1/organizations/:org_id` - Delete organization and all its data

use super::{enter_organization, DeletedResponse};
use crate::{app::AppState, error::ApiResult};
use attendly_shared::models::{CreateOrganization, Organization, UpdateOrganization};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

/// List organizations response
#[derive(Debug, Serialize)]
pub struct ListOrganizationsResponse {
    pub organizations: Vec<Organization>,
}

pub async fn list_organizations(
    State(state): State<AppState>,
) -> ApiResult<Json<ListOrganizationsResponse>> {
    let organizations = state.services.organizations.get_all().await?;
    Ok(Json(ListOrganizationsResponse { organizations }))
}

/// Create organization
///
/// # Endpoint
///
/// ```text
/// POST /v1/organizations
/// Content-Type: application/json
///
/// {
///   "name": "音楽サークル",
///   "description": "Weekly rehearsals"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Malformed body
/// - `422 Unprocessable Entity`: Validation failed
pub async fn create_organization(
    State(state): State<AppState>,
    payload: Result<Json<CreateOrganization>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Organization>)> {
    let Json(req) = payload?;
    let organization = state.services.organizations.create(req).await?;
    Ok((StatusCode::CREATED, Json(organization)))
}

pub async fn get_organization(
    State(state): State<AppState>,
    Path(org_id): Path<String>,
) -> ApiResult<Json<Organization>> {
    let organization = enter_organization(&state, &org_id).await?;
    Ok(Json(organization))
}

pub async fn update_organization(
    State(state): State<AppState>,
    Path(org_id): Path<String>,
    payload: Result<Json<UpdateOrganization>, JsonRejection>,
) -> ApiResult<Json<Organization>> {
    let Json(req) = payload?;
    state.tenant.set_active_organization(&org_id).await;
    let organization = state.services.organizations.update(&org_id, req).await?;
    Ok(Json(organization))
}

/// Delete organization
///
/// Removes the organization, then its groups, members, event dates and
/// attendance records.
///
/// # Errors
///
/// - `404 Not Found`: Organization not found
pub async fn delete_organization(
    State(state): State<AppState>,
    Path(org_id): Path<String>,
) -> ApiResult<Json<DeletedResponse>> {
    state.tenant.set_active_organization(&org_id).await;
    state.services.organizations.delete(&org_id).await?;
    if state.tenant.active_organization().as_deref() == Some(org_id.as_str()) {
        state.tenant.clear();
    }
    Ok(Json(DeletedResponse { deleted: true }))
}
