/// Group endpoints
///
/// # Endpoints
///
/// - `GET /v1/organizations/:org_id/groups` - List groups in display order
/// - `POST /v1/organizations/:org_id/groups` - Create group
/// - `GET /v1/organizations/:org_id/groups/:id` - Get group
/// - `PATCH /v1/organizations/:org_id/groups/:id` - Update group
/// - `DELETE /v1/organizations/:org_id/groups/:id` - Delete group, its members and their answers

use super::{enter_organization, DeletedResponse};
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use attendly_shared::models::{CreateGroup, Group, UpdateGroup};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ListGroupsResponse {
    pub groups: Vec<Group>,
}

pub async fn list_groups(
    State(state): State<AppState>,
    Path(org_id): Path<String>,
) -> ApiResult<Json<ListGroupsResponse>> {
    enter_organization(&state, &org_id).await?;
    let groups = state.services.groups.get_sorted(&org_id).await?;
    Ok(Json(ListGroupsResponse { groups }))
}

pub async fn create_group(
    State(state): State<AppState>,
    Path(org_id): Path<String>,
    payload: Result<Json<CreateGroup>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Group>)> {
    let Json(req) = payload?;
    enter_organization(&state, &org_id).await?;
    let group = state.services.groups.create(&org_id, req).await?;
    Ok((StatusCode::CREATED, Json(group)))
}

pub async fn get_group(
    State(state): State<AppState>,
    Path((org_id, id)): Path<(String, String)>,
) -> ApiResult<Json<Group>> {
    enter_organization(&state, &org_id).await?;
    state
        .services
        .groups
        .get_by_id(&org_id, &id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("group not found: {}", id)))
}

pub async fn update_group(
    State(state): State<AppState>,
    Path((org_id, id)): Path<(String, String)>,
    payload: Result<Json<UpdateGroup>, JsonRejection>,
) -> ApiResult<Json<Group>> {
    let Json(req) = payload?;
    enter_organization(&state, &org_id).await?;
    let group = state.services.groups.update(&org_id, &id, req).await?;
    Ok(Json(group))
}

pub async fn delete_group(
    State(state): State<AppState>,
    Path((org_id, id)): Path<(String, String)>,
) -> ApiResult<Json<DeletedResponse>> {
    enter_organization(&state, &org_id).await?;
    state.services.groups.delete(&org_id, &id).await?;
    Ok(Json(DeletedResponse { deleted: true }))
}
