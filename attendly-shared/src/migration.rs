/// Legacy data migration
///
/// Installs that predate multi-tenancy kept their data under four fixed
/// local keys with no organization id. This module moves that data into a
/// default organization, once.
///
/// # State Machine
///
/// ```text
/// NotChecked ──flag present──────────────────────────> Completed
///      │
///      ├──no legacy keys──> write flag ──────────────> Skipped
///      │
///      └──legacy keys──> create default organization
///                        re-tag and move each collection
///                        write flag ─────────────────> Migrated
/// ```
///
/// The flag is written last. Any failure before it leaves the flag unset
/// and the whole migration runs again on the next start. The default
/// organization has a fixed id, so a retry overwrites the same organization
/// and re-stamps records with the same id instead of creating duplicates.
///
/// Failures never escape [`LegacyMigrator::run`]; they are reported in the
/// returned [`MigrationReport`] so the caller can decide whether to block
/// startup.
///
/// # Example
///
/// ```no_run
/// use attendly_shared::migration::LegacyMigrator;
/// use attendly_shared::storage::Storage;
///
/// # fn example(storage: Storage) {
/// let mut migrator = LegacyMigrator::new(storage.local_store().clone());
/// let report = migrator.run();
/// if let Some(error) = report.error {
///     eprintln!("legacy migration failed: {}", error);
/// }
/// # }
/// ```

use crate::error::{Result, StorageError};
use crate::models::{
    Attendance, AttendanceStatus, EventDate, Group, Member, Organization, TenantRecord,
};
use crate::services::now_micros;
use crate::storage::local::{collection_key, legacy_key, LocalStore, ORGANIZATIONS_KEY};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, warn};

/// Flag key; holds the literal string `"true"` once migration has run
pub const MIGRATION_FLAG_KEY: &str = "attendance_migration_completed";

/// Id of the organization legacy data is moved into
pub const DEFAULT_ORGANIZATION_ID: &str = "legacy-default";

pub const DEFAULT_ORGANIZATION_NAME: &str = "デフォルト組織";

pub const DEFAULT_ORGANIZATION_DESCRIPTION: &str = "既存データから移行された組織";

/// Where the migrator stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationState {
    /// `run` has not completed yet
    NotChecked,

    /// Legacy data was moved in this run
    Migrated,

    /// No legacy data; flag written without migrating
    Skipped,

    /// Flag was already present
    Completed,
}

/// Outcome of one [`LegacyMigrator::run`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationReport {
    /// True only when legacy data was moved in this run
    pub migrated: bool,

    /// The organization legacy data now belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,

    /// Why the run failed, if it did
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MigrationReport {
    fn not_migrated() -> Self {
        Self {
            migrated: false,
            organization_id: None,
            error: None,
        }
    }
}

/// One-shot upgrade of legacy local data
#[derive(Debug)]
pub struct LegacyMigrator {
    local: LocalStore,
    state: MigrationState,
}

impl LegacyMigrator {
    pub fn new(local: LocalStore) -> Self {
        Self {
            local,
            state: MigrationState::NotChecked,
        }
    }

    pub fn state(&self) -> MigrationState {
        self.state
    }

    /// Runs the migration if it has not run before
    ///
    /// Never fails: errors are logged and returned in the report, and the
    /// state stays `NotChecked` so a later call retries.
    pub fn run(&mut self) -> MigrationReport {
        match self.migrate() {
            Ok((state, report)) => {
                self.state = state;
                report
            }
            Err(e) => {
                warn!(error = %e, "Legacy migration failed; it will be retried on next start");
                MigrationReport {
                    migrated: false,
                    organization_id: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    fn migrate(&self) -> Result<(MigrationState, MigrationReport)> {
        if self.local.get_raw(MIGRATION_FLAG_KEY)?.as_deref() == Some("true") {
            return Ok((MigrationState::Completed, MigrationReport::not_migrated()));
        }

        let legacy_keys = [
            legacy_key(EventDate::COLLECTION),
            legacy_key(Group::COLLECTION),
            legacy_key(Member::COLLECTION),
            legacy_key(Attendance::COLLECTION),
        ];
        let mut any_legacy = false;
        for key in &legacy_keys {
            any_legacy |= self.local.contains(key)?;
        }

        if !any_legacy {
            self.local.set_raw(MIGRATION_FLAG_KEY, "true")?;
            info!("No legacy data found; migration skipped");
            return Ok((MigrationState::Skipped, MigrationReport::not_migrated()));
        }

        let now = now_micros();
        let organization = Organization {
            id: DEFAULT_ORGANIZATION_ID.to_string(),
            name: DEFAULT_ORGANIZATION_NAME.to_string(),
            description: Some(DEFAULT_ORGANIZATION_DESCRIPTION.to_string()),
            created_at: now,
        };
        self.upsert_organization(&organization)?;

        let event_dates = self.move_collection::<LegacyEventDate>(&organization.id, now)?;
        let groups = self.move_collection::<LegacyGroup>(&organization.id, now)?;
        let members = self.move_collection::<LegacyMember>(&organization.id, now)?;
        let attendances = self.move_collection::<LegacyAttendance>(&organization.id, now)?;

        self.local.set_raw(MIGRATION_FLAG_KEY, "true")?;

        info!(
            organization_id = %organization.id,
            event_dates,
            groups,
            members,
            attendances,
            "Legacy data migrated"
        );

        Ok((
            MigrationState::Migrated,
            MigrationReport {
                migrated: true,
                organization_id: Some(organization.id),
                error: None,
            },
        ))
    }

    fn upsert_organization(&self, organization: &Organization) -> Result<()> {
        let mut organizations: Vec<Organization> = self.local.load(ORGANIZATIONS_KEY)?;
        organizations.retain(|o| o.id != organization.id);
        organizations.push(organization.clone());
        self.local.save(ORGANIZATIONS_KEY, &organizations)?;
        Ok(())
    }

    /// Parses, re-tags and moves one legacy collection; returns its size
    fn move_collection<L: LegacyRecord>(
        &self,
        organization_id: &str,
        migrated_at: DateTime<Utc>,
    ) -> Result<usize> {
        let source = legacy_key(L::Record::COLLECTION);
        let Some(raw) = self.local.get_raw(&source)? else {
            return Ok(0);
        };

        let legacy: Vec<L> =
            serde_json::from_str(&raw).map_err(|e| StorageError::Serialization {
                key: source.clone(),
                source: e,
            })?;
        let records: Vec<L::Record> = L::collapse(
            legacy
                .into_iter()
                .map(|record| record.into_record(organization_id, migrated_at))
                .collect(),
        );

        self.local.save(
            &collection_key(L::Record::COLLECTION, organization_id),
            &records,
        )?;
        self.local.clear(&source)?;
        Ok(records.len())
    }
}

/// A legacy record shape and how it becomes a tenant record
trait LegacyRecord: DeserializeOwned {
    type Record: TenantRecord;

    fn into_record(self, organization_id: &str, migrated_at: DateTime<Utc>) -> Self::Record;

    /// Drops records the current model does not allow to coexist
    fn collapse(records: Vec<Self::Record>) -> Vec<Self::Record> {
        records
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyEventDate {
    id: String,
    date: NaiveDate,
    title: String,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl LegacyRecord for LegacyEventDate {
    type Record = EventDate;

    fn into_record(self, organization_id: &str, migrated_at: DateTime<Utc>) -> EventDate {
        EventDate {
            id: self.id,
            organization_id: organization_id.to_string(),
            date: self.date,
            title: self.title,
            location: self.location,
            created_at: self.created_at.unwrap_or(migrated_at),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyGroup {
    id: String,
    name: String,
    #[serde(default)]
    order: i32,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl LegacyRecord for LegacyGroup {
    type Record = Group;

    fn into_record(self, organization_id: &str, migrated_at: DateTime<Utc>) -> Group {
        Group {
            id: self.id,
            organization_id: organization_id.to_string(),
            name: self.name,
            order: self.order,
            color: self.color,
            created_at: self.created_at.unwrap_or(migrated_at),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyMember {
    id: String,
    group_id: String,
    name: String,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl LegacyRecord for LegacyMember {
    type Record = Member;

    fn into_record(self, organization_id: &str, migrated_at: DateTime<Utc>) -> Member {
        Member {
            id: self.id,
            organization_id: organization_id.to_string(),
            group_id: self.group_id,
            name: self.name,
            created_at: self.created_at.unwrap_or(migrated_at),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyAttendance {
    id: String,
    event_date_id: String,
    member_id: String,
    status: AttendanceStatus,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl LegacyRecord for LegacyAttendance {
    type Record = Attendance;

    fn into_record(self, organization_id: &str, migrated_at: DateTime<Utc>) -> Attendance {
        Attendance {
            id: self.id,
            organization_id: organization_id.to_string(),
            event_date_id: self.event_date_id,
            member_id: self.member_id,
            status: self.status,
            created_at: self.created_at.unwrap_or(migrated_at),
        }
    }

    // Legacy installs could store several answers for one (event, member)
    // pair. The last one wins and takes the slot of the first.
    fn collapse(records: Vec<Attendance>) -> Vec<Attendance> {
        let mut slots: HashMap<(String, String), usize> = HashMap::new();
        let mut collapsed: Vec<Attendance> = Vec::with_capacity(records.len());
        for record in records {
            let pair = (record.event_date_id.clone(), record.member_id.clone());
            match slots.get(&pair).copied() {
                Some(slot) => collapsed[slot] = record,
                None => {
                    slots.insert(pair, collapsed.len());
                    collapsed.push(record);
                }
            }
        }
        collapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_present_completes_without_side_effects() {
        let local = LocalStore::in_memory();
        local.set_raw(MIGRATION_FLAG_KEY, "true").unwrap();
        local.set_raw("attendance_groups", "[]").unwrap();

        let mut migrator = LegacyMigrator::new(local.clone());
        let report = migrator.run();

        assert!(!report.migrated);
        assert_eq!(migrator.state(), MigrationState::Completed);
        assert!(local.contains("attendance_groups").unwrap());
    }

    #[test]
    fn test_legacy_group_without_optional_fields_parses() {
        let parsed: Vec<LegacyGroup> =
            serde_json::from_str(r#"[{"id":"g1","name":"Soprano"}]"#).unwrap();
        let group = parsed
            .into_iter()
            .next()
            .unwrap()
            .into_record("org", Utc::now());
        assert_eq!(group.order, 0);
        assert_eq!(group.organization_id, "org");
    }

    #[test]
    fn test_report_serializes_like_a_result_object() {
        let json = serde_json::to_value(MigrationReport::not_migrated()).unwrap();
        assert_eq!(json, serde_json::json!({ "migrated": false }));
    }
}
