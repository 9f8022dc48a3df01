/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `organizations`: Organization CRUD
/// - `groups`, `members`, `event_dates`: Organization-scoped CRUD
/// - `attendances`: Recording answers and per-event summaries

pub mod attendances;
pub mod event_dates;
pub mod groups;
pub mod health;
pub mod members;
pub mod organizations;

use crate::{app::AppState, error::ApiResult};
use attendly_shared::models::Organization;

/// Enters an organization's scope for the rest of the request
///
/// Marks the organization active on the tenant context, then checks that it
/// exists so nested resources of an unknown organization answer 404.
pub(crate) async fn enter_organization(state: &AppState, org_id: &str) -> ApiResult<Organization> {
    state.tenant.set_active_organization(org_id).await;
    Ok(state.services.organizations.require(org_id).await?)
}

/// Body of a successful delete
#[derive(Debug, serde::Serialize)]
pub struct DeletedResponse {
    pub deleted: bool,
}
