/// Attendance model
///
/// One member's response to one event date. At most one record exists per
/// (event_date_id, member_id) pair: the attendance service updates an
/// existing pair in place and the remote schema carries a unique index.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE attendance_status AS ENUM ('attending', 'tentative', 'absent');
///
/// CREATE TABLE attendances (
///     id TEXT PRIMARY KEY,
///     organization_id TEXT NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
///     event_date_id TEXT NOT NULL REFERENCES event_dates(id) ON DELETE CASCADE,
///     member_id TEXT NOT NULL REFERENCES members(id) ON DELETE CASCADE,
///     status attendance_status NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE UNIQUE INDEX idx_attendances_event_member ON attendances (event_date_id, member_id);
/// ```

use super::record::{PgQuery, TenantRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

/// Response status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "attendance_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    /// Will attend
    Attending,

    /// Undecided
    Tentative,

    /// Will not attend
    Absent,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Attending => "attending",
            AttendanceStatus::Tentative => "tentative",
            AttendanceStatus::Absent => "absent",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    pub id: String,

    pub organization_id: String,

    pub event_date_id: String,

    pub member_id: String,

    pub status: AttendanceStatus,

    pub created_at: DateTime<Utc>,
}

impl TenantRecord for Attendance {
    const COLLECTION: &'static str = "attendances";
    const TABLE: &'static str = "attendances";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "organization_id",
        "event_date_id",
        "member_id",
        "status",
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
            .bind(self.event_date_id.clone())
            .bind(self.member_id.clone())
            .bind(self.status)
            .bind(self.created_at)
    }
}

/// Input for recording (or changing) a member's response to an event
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecordAttendance {
    #[validate(length(min = 1, message = "Member is required"))]
    pub member_id: String,

    pub status: AttendanceStatus,
}
