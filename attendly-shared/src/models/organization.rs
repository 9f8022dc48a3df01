/// Organization model
///
/// Organizations are the tenant boundary. Every event date, group, member
/// and attendance record carries the id of the organization it belongs to,
/// and deleting an organization cascades to all of them.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE organizations (
///     id TEXT PRIMARY KEY,
///     name VARCHAR(100) NOT NULL,
///     description VARCHAR(500),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use attendly_shared::models::CreateOrganization;
/// use attendly_shared::services::OrganizationService;
/// use attendly_shared::storage::Storage;
///
/// # async fn example() -> attendly_shared::Result<()> {
/// let service = OrganizationService::new(Storage::in_memory());
///
/// let organization = service
///     .create(CreateOrganization {
///         name: "音楽サークル".to_string(),
///         description: None,
///     })
///     .await?;
/// println!("Created organization: {}", organization.id);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Organization (tenant) record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    /// Unique organization id
    pub id: String,

    /// Display name
    pub name: String,

    /// Optional free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// When the organization was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new organization
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrganization {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[serde(default)]
    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,
}

/// Input for updating an organization
///
/// Fields left as `None` keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrganization {
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[serde(default)]
    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,
}

impl UpdateOrganization {
    /// Shallow-merges the provided fields over `organization`
    pub fn apply(self, organization: &mut Organization) {
        if let Some(name) = self.name {
            organization.name = name;
        }
        if let Some(description) = self.description {
            organization.description = Some(description);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Organization {
        Organization {
            id: "org1".to_string(),
            name: "Choir".to_string(),
            description: Some("Sunday rehearsals".to_string()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("created_at").is_none());
    }

    #[test]
    fn test_missing_description_deserializes() {
        let org: Organization = serde_json::from_str(
            r#"{"id":"o","name":"n","createdAt":"2025-01-03T12:00:00Z"}"#,
        )
        .unwrap();
        assert!(org.description.is_none());
    }

    #[test]
    fn test_create_validation() {
        let empty = CreateOrganization {
            name: String::new(),
            description: None,
        };
        let errors = empty.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
    }

    #[test]
    fn test_update_keeps_unset_fields() {
        let mut org = sample();
        UpdateOrganization {
            name: Some("Orchestra".to_string()),
            description: None,
        }
        .apply(&mut org);

        assert_eq!(org.name, "Orchestra");
        assert_eq!(org.description.as_deref(), Some("Sunday rehearsals"));
        assert_eq!(org.id, "org1");
    }
}
