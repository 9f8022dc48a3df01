/// Member model
///
/// A member belongs to exactly one group of the same organization.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE members (
///     id TEXT PRIMARY KEY,
///     organization_id TEXT NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
///     group_id TEXT NOT NULL REFERENCES groups(id) ON DELETE CASCADE,
///     name VARCHAR(50) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use super::record::{PgQuery, TenantRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,

    pub organization_id: String,

    pub group_id: String,

    pub name: String,

    pub created_at: DateTime<Utc>,
}

impl TenantRecord for Member {
    const COLLECTION: &'static str = "members";
    const TABLE: &'static str = "members";
    const COLUMNS: &'static [&'static str] =
        &["id", "organization_id", "group_id", "name", "created_at"];

    fn id(&self) -> &str {
        &self.id
    }

    fn organization_id(&self) -> &str {
        &self.organization_id
    }

    fn bind_columns<'q>(&self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(self.id.clone())
            .bind(self.organization_id.clone())
            .bind(self.group_id.clone())
            .bind(self.name.clone())
            .bind(self.created_at)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMember {
    #[validate(length(min = 1, message = "Group is required"))]
    pub group_id: String,

    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    pub name: String,
}

/// Input for updating a member; `None` keeps the current value
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMember {
    #[serde(default)]
    #[validate(length(min = 1, message = "Group is required"))]
    pub group_id: Option<String>,

    #[serde(default)]
    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    pub name: Option<String>,
}

impl UpdateMember {
    pub fn apply(self, member: &mut Member) {
        if let Some(group_id) = self.group_id {
            member.group_id = group_id;
        }
        if let Some(name) = self.name {
            member.name = name;
        }
    }
}
