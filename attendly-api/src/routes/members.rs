/// Member endpoints
///
/// # Endpoints
///
/// - `GET /v1/organizations/:org_id/members[?groupId=]` - List members
/// - `POST /v1/organizations/:org_id/members` - Create member
/// - `GET /v1/organizations/:org_id/members/:id` - Get member
/// - `PATCH /v1/organizations/:org_id/members/:id` - Update or move member
/// - `DELETE /v1/organizations/:org_id/members/:id` - Delete member and their answers

use super::{enter_organization, DeletedResponse};
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use attendly_shared::models::{CreateMember, Member, UpdateMember};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

/// List filter
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMembersQuery {
    /// Only members of this group
    pub group_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListMembersResponse {
    pub members: Vec<Member>,
}

pub async fn list_members(
    State(state): State<AppState>,
    Path(org_id): Path<String>,
    Query(query): Query<ListMembersQuery>,
) -> ApiResult<Json<ListMembersResponse>> {
    enter_organization(&state, &org_id).await?;
    let members = match query.group_id {
        Some(group_id) => state.services.members.get_by_group(&org_id, &group_id).await?,
        None => state.services.members.get_all(&org_id).await?,
    };
    Ok(Json(ListMembersResponse { members }))
}

/// Create member
///
/// # Errors
///
/// - `404 Not Found`: Organization not found
/// - `422 Unprocessable Entity`: Validation failed or `groupId` unknown
pub async fn create_member(
    State(state): State<AppState>,
    Path(org_id): Path<String>,
    payload: Result<Json<CreateMember>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Member>)> {
    let Json(req) = payload?;
    enter_organization(&state, &org_id).await?;
    let member = state.services.members.create(&org_id, req).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

pub async fn get_member(
    State(state): State<AppState>,
    Path((org_id, id)): Path<(String, String)>,
) -> ApiResult<Json<Member>> {
    enter_organization(&state, &org_id).await?;
    state
        .services
        .members
        .get_by_id(&org_id, &id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("member not found: {}", id)))
}

pub async fn update_member(
    State(state): State<AppState>,
    Path((org_id, id)): Path<(String, String)>,
    payload: Result<Json<UpdateMember>, JsonRejection>,
) -> ApiResult<Json<Member>> {
    let Json(req) = payload?;
    enter_organization(&state, &org_id).await?;
    let member = state.services.members.update(&org_id, &id, req).await?;
    Ok(Json(member))
}

pub async fn delete_member(
    State(state): State<AppState>,
    Path((org_id, id)): Path<(String, String)>,
) -> ApiResult<Json<DeletedResponse>> {
    enter_organization(&state, &org_id).await?;
    state.services.members.delete(&org_id, &id).await?;
    Ok(Json(DeletedResponse { deleted: true }))
}
