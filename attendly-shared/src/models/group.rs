/// Group model
///
/// Groups order members for display. `order` is a rank, not a position:
/// values need not be contiguous and ties are broken by name.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE groups (
///     id TEXT PRIMARY KEY,
///     organization_id TEXT NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
///     name VARCHAR(50) NOT NULL,
///     display_order INTEGER NOT NULL DEFAULT 0,
///     color VARCHAR(32),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use super::record::{PgQuery, TenantRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,

    pub organization_id: String,

    pub name: String,

    /// Display rank (ascending)
    #[sqlx(rename = "display_order")]
    pub order: i32,

    /// Optional display color, e.g. "#3b82f6"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl Group {
    /// Display ordering: `order` ascending, then `name`
    pub fn display_cmp(&self, other: &Group) -> Ordering {
        self.order
            .cmp(&other.order)
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl TenantRecord for Group {
    const COLLECTION: &'static str = "groups";
    const TABLE: &'static str = "groups";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "organization_id",
        "name",
        "display_order",
        "color",
        "created_at",
    ];

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
            .bind(self.name.clone())
            .bind(self.order)
            .bind(self.color.clone())
            .bind(self.created_at)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroup {
    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    pub name: String,

    #[serde(default)]
    #[validate(range(min = 0, message = "Order must not be negative"))]
    pub order: i32,

    #[serde(default)]
    #[validate(length(max = 32, message = "Color must be at most 32 characters"))]
    pub color: Option<String>,
}

/// Input for updating a group; `None` keeps the current value
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGroup {
    #[serde(default)]
    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    pub name: Option<String>,

    #[serde(default)]
    #[validate(range(min = 0, message = "Order must not be negative"))]
    pub order: Option<i32>,

    #[serde(default)]
    #[validate(length(max = 32, message = "Color must be at most 32 characters"))]
    pub color: Option<String>,
}

impl UpdateGroup {
    pub fn apply(self, group: &mut Group) {
        if let Some(name) = self.name {
            group.name = name;
        }
        if let Some(order) = self.order {
            group.order = order;
        }
        if let Some(color) = self.color {
            group.color = Some(color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(name: &str, order: i32) -> Group {
        Group {
            id: name.to_lowercase(),
            organization_id: "o1".to_string(),
            name: name.to_string(),
            order,
            color: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_display_cmp_uses_order_then_name() {
        let mut groups = vec![group("Tenor", 2), group("Bass", 2), group("Soprano", 1)];
        groups.sort_by(Group::display_cmp);
        let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Soprano", "Bass", "Tenor"]);
    }

    #[test]
    fn test_negative_order_rejected() {
        let input = CreateGroup {
            name: "Alto".to_string(),
            order: -1,
            color: None,
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_order_field_keeps_its_json_name() {
        let json = serde_json::to_value(group("Alto", 3)).unwrap();
        assert_eq!(json["order"], 3);
    }
}
