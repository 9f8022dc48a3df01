/// Event date model
///
/// # Schema
///
/// ```sql
/// CREATE TABLE event_dates (
///     id TEXT PRIMARY KEY,
///     organization_id TEXT NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
///     date DATE NOT NULL,
///     title VARCHAR(100) NOT NULL,
///     location VARCHAR(200),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use super::record::{PgQuery, TenantRecord};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A dated event (rehearsal, match, meeting)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EventDate {
    pub id: String,

    pub organization_id: String,

    /// Calendar date, serialized as YYYY-MM-DD
    pub date: NaiveDate,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl TenantRecord for EventDate {
    const COLLECTION: &'static str = "event_dates";
    const TABLE: &'static str = "event_dates";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "organization_id",
        "date",
        "title",
        "location",
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
            .bind(self.date)
            .bind(self.title.clone())
            .bind(self.location.clone())
            .bind(self.created_at)
    }
}

/// Input for creating an event date
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventDate {
    pub date: NaiveDate,

    #[validate(length(min = 1, max = 100, message = "Title must be 1-100 characters"))]
    pub title: String,

    #[serde(default)]
    #[validate(length(max = 200, message = "Location must be at most 200 characters"))]
    pub location: Option<String>,
}

/// Input for updating an event date; `None` keeps the current value
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventDate {
    #[serde(default)]
    pub date: Option<NaiveDate>,

    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Title must be 1-100 characters"))]
    pub title: Option<String>,

    #[serde(default)]
    #[validate(length(max = 200, message = "Location must be at most 200 characters"))]
    pub location: Option<String>,
}

impl UpdateEventDate {
    pub fn apply(self, event_date: &mut EventDate) {
        if let Some(date) = self.date {
            event_date.date = date;
        }
        if let Some(title) = self.title {
            event_date.title = title;
        }
        if let Some(location) = self.location {
            event_date.location = Some(location);
        }
    }
}
