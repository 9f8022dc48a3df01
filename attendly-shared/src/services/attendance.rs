use super::{field_error, new_id, now_micros};
use crate::error::{Error, Result};
use crate::models::{Attendance, AttendanceStatus, EventDate, Group, RecordAttendance};
use crate::storage::Storage;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;
use validator::Validate;

/// Response tallies for a set of members
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub attending: usize,
    pub tentative: usize,
    pub absent: usize,
    /// Members with no record for the event
    pub unanswered: usize,
    /// attending + tentative + absent
    pub responded: usize,
}

impl StatusCounts {
    fn add(&mut self, status: Option<AttendanceStatus>) {
        match status {
            Some(AttendanceStatus::Attending) => self.attending += 1,
            Some(AttendanceStatus::Tentative) => self.tentative += 1,
            Some(AttendanceStatus::Absent) => self.absent += 1,
            None => {
                self.unanswered += 1;
                return;
            }
        }
        self.responded += 1;
    }

    fn merge(&mut self, other: &StatusCounts) {
        self.attending += other.attending;
        self.tentative += other.tentative;
        self.absent += other.absent;
        self.unanswered += other.unanswered;
        self.responded += other.responded;
    }
}

/// One member's answer for an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberResponse {
    pub member_id: String,
    pub member_name: String,
    pub status: Option<AttendanceStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSummary {
    pub group_id: String,
    pub group_name: String,
    pub order: i32,
    pub counts: StatusCounts,
    pub members: Vec<MemberResponse>,
}

/// Attendance overview of one event date, grouped in display order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    pub event_date: EventDate,
    pub groups: Vec<GroupSummary>,
    pub totals: StatusCounts,
}

#[derive(Clone, Debug)]
pub struct AttendanceService {
    storage: Storage,
}

impl AttendanceService {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    async fn require_event_date(&self, organization_id: &str, event_date_id: &str) -> Result<EventDate> {
        self.storage
            .load_event_dates(organization_id)
            .await?
            .into_iter()
            .find(|e| e.id == event_date_id)
            .ok_or_else(|| Error::not_found("event date", event_date_id))
    }

    /// Records a member's answer for an event date
    ///
    /// A (event date, member) pair holds at most one record: answering again
    /// overwrites the status of the existing record and keeps its id.
    ///
    /// # Errors
    ///
    /// - `Error::NotFound` if the event date does not exist
    /// - `Error::Validation` if the member does not exist in the organization
    pub async fn record(
        &self,
        organization_id: &str,
        event_date_id: &str,
        input: RecordAttendance,
    ) -> Result<Attendance> {
        input.validate()?;
        self.require_event_date(organization_id, event_date_id).await?;

        let members = self.storage.load_members(organization_id).await?;
        if !members.iter().any(|m| m.id == input.member_id) {
            return Err(field_error(
                "memberId",
                "unknown_member",
                "Member does not exist in this organization",
            )
            .into());
        }

        let mut attendances = self.storage.load_attendances(organization_id).await?;
        let existing = attendances
            .iter_mut()
            .find(|a| a.event_date_id == event_date_id && a.member_id == input.member_id);

        let recorded = match existing {
            Some(attendance) => {
                attendance.status = input.status;
                attendance.clone()
            }
            None => {
                let attendance = Attendance {
                    id: new_id(),
                    organization_id: organization_id.to_string(),
                    event_date_id: event_date_id.to_string(),
                    member_id: input.member_id,
                    status: input.status,
                    created_at: now_micros(),
                };
                attendances.push(attendance.clone());
                attendance
            }
        };

        self.storage
            .save_attendances(organization_id, &attendances)
            .await?;

        debug!(
            organization_id,
            event_date_id,
            member_id = %recorded.member_id,
            status = %recorded.status,
            "Attendance recorded"
        );
        Ok(recorded)
    }

    pub async fn get_all(&self, organization_id: &str) -> Result<Vec<Attendance>> {
        self.storage.load_attendances(organization_id).await
    }

    pub async fn get_for_event(&self, organization_id: &str, event_date_id: &str) -> Result<Vec<Attendance>> {
        let attendances = self.get_all(organization_id).await?;
        Ok(attendances
            .into_iter()
            .filter(|a| a.event_date_id == event_date_id)
            .collect())
    }

    pub async fn delete(&self, organization_id: &str, id: &str) -> Result<()> {
        let mut attendances = self.get_all(organization_id).await?;
        let before = attendances.len();
        attendances.retain(|a| a.id != id);
        if attendances.len() == before {
            return Err(Error::not_found("attendance", id));
        }
        self.storage
            .save_attendances(organization_id, &attendances)
            .await
    }

    /// Per-group tallies for one event date
    ///
    /// Groups come in display order and members keep storage order within
    /// their group. Members of a group that no longer exists are left out.
    pub async fn summarize(&self, organization_id: &str, event_date_id: &str) -> Result<EventSummary> {
        let event_date = self.require_event_date(organization_id, event_date_id).await?;

        let mut groups = self.storage.load_groups(organization_id).await?;
        groups.sort_by(Group::display_cmp);
        let members = self.storage.load_members(organization_id).await?;
        let statuses: HashMap<String, AttendanceStatus> = self
            .get_for_event(organization_id, event_date_id)
            .await?
            .into_iter()
            .map(|a| (a.member_id, a.status))
            .collect();

        let mut totals = StatusCounts::default();
        let summaries = groups
            .into_iter()
            .map(|group| {
                let mut counts = StatusCounts::default();
                let responses: Vec<MemberResponse> = members
                    .iter()
                    .filter(|m| m.group_id == group.id)
                    .map(|m| {
                        let status = statuses.get(&m.id).copied();
                        counts.add(status);
                        MemberResponse {
                            member_id: m.id.clone(),
                            member_name: m.name.clone(),
                            status,
                        }
                    })
                    .collect();
                totals.merge(&counts);

                GroupSummary {
                    group_id: group.id,
                    group_name: group.name,
                    order: group.order,
                    counts,
                    members: responses,
                }
            })
            .collect();

        Ok(EventSummary {
            event_date,
            groups: summaries,
            totals,
        })
    }
}
