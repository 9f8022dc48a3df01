/// Domain models for Attendly
///
/// # Models
///
/// - `organization`: Tenant root; every other record carries its id
/// - `event_date`: A dated event members respond to
/// - `group`: Display grouping of members (sections, parts, teams)
/// - `member`: A person belonging to exactly one group
/// - `attendance`: One member's response to one event
///
/// Records serialize with camelCase field names (the local JSON layout) and
/// map to snake_case columns in the remote tables.
///
/// All tenant-scoped records implement [`TenantRecord`], which lets the
/// storage adapters handle every collection with one generic code path.

pub mod attendance;
pub mod event_date;
pub mod group;
pub mod member;
pub mod organization;
mod record;

pub use attendance::{Attendance, AttendanceStatus, RecordAttendance};
pub use event_date::{CreateEventDate, EventDate, UpdateEventDate};
pub use group::{CreateGroup, Group, UpdateGroup};
pub use member::{CreateMember, Member, UpdateMember};
pub use organization::{CreateOrganization, Organization, UpdateOrganization};
pub use record::{PgQuery, TenantRecord};
