//! Domain services
//!
//! Thin business rules over the [`Storage`] facade: id and timestamp
//! assignment, validation, shallow-merge updates, cascades and attendance
//! summaries.
//!
//! # Concurrency
//!
//! Every mutation reads the full collection, changes it in memory and writes
//! it back. Two concurrent writers to the same organization's collection
//! race and the last write wins. This matches the expected usage (one
//! administrator per organization at a time) and is not guarded against.
//!
//! # Example
//!
//! ```no_run
//! use attendly_shared::models::{CreateGroup, CreateOrganization};
//! use attendly_shared::services::Services;
//! use attendly_shared::storage::Storage;
//!
//! # async fn example() -> attendly_shared::Result<()> {
//! let services = Services::new(Storage::in_memory());
//!
//! let org = services
//!     .organizations
//!     .create(CreateOrganization { name: "音楽サークル".to_string(), description: None })
//!     .await?;
//! let group = services
//!     .groups
//!     .create(&org.id, CreateGroup { name: "Soprano".to_string(), order: 1, color: None })
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod attendance;
pub mod event_date;
pub mod group;
pub mod member;
pub mod organization;

pub use attendance::{AttendanceService, EventSummary, GroupSummary, MemberResponse, StatusCounts};
pub use event_date::EventDateService;
pub use group::GroupService;
pub use member::MemberService;
pub use organization::OrganizationService;

use crate::storage::Storage;
use chrono::{DateTime, SubsecRound, Utc};
use rand::Rng;
use std::borrow::Cow;
use validator::{ValidationError, ValidationErrors};

/// Length of generated ids
pub const ID_LENGTH: usize = 12;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generates a short random id
///
/// 36^12 possible values; ids are not checked against existing records.
pub fn new_id() -> String {
    let mut rng = rand::thread_rng();
    (0..ID_LENGTH)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

/// Current time at microsecond precision
///
/// `TIMESTAMPTZ` keeps microseconds, so creation timestamps are truncated
/// up front and read back unchanged from either backend.
pub fn now_micros() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Builds a single-field validation error
pub(crate) fn field_error(
    field: &'static str,
    code: &'static str,
    message: impl Into<Cow<'static, str>>,
) -> ValidationErrors {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());

    let mut errors = ValidationErrors::new();
    errors.add(field, error);
    errors
}

/// All domain services over one storage handle
#[derive(Clone, Debug)]
pub struct Services {
    pub organizations: OrganizationService,
    pub groups: GroupService,
    pub members: MemberService,
    pub event_dates: EventDateService,
    pub attendance: AttendanceService,
}

impl Services {
    pub fn new(storage: Storage) -> Self {
        Self {
            organizations: OrganizationService::new(storage.clone()),
            groups: GroupService::new(storage.clone()),
            members: MemberService::new(storage.clone()),
            event_dates: EventDateService::new(storage.clone()),
            attendance: AttendanceService::new(storage),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_new_id_shape() {
        let id = new_id();
        assert_eq!(id.len(), ID_LENGTH);
        assert!(id.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_new_id_does_not_repeat() {
        let ids: HashSet<String> = (0..1000).map(|_| new_id()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_now_micros_drops_nanoseconds() {
        use chrono::Timelike;
        assert_eq!(now_micros().nanosecond() % 1_000, 0);
    }

    #[test]
    fn test_field_error_carries_message() {
        let errors = field_error("groupId", "unknown_group", "Group does not exist");
        let field_errors = errors.field_errors();
        let entries = field_errors.get("groupId").unwrap();
        assert_eq!(entries[0].message.as_deref(), Some("Group does not exist"));
    }
}
