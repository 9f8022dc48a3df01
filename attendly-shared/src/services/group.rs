use super::{new_id, now_micros};
use crate::error::{Error, Result};
use crate::models::{Attendance, CreateGroup, Group, Member, UpdateGroup};
use crate::storage::Storage;
use std::collections::HashSet;
use tracing::debug;
use validator::Validate;

#[derive(Clone, Debug)]
pub struct GroupService {
    storage: Storage,
}

impl GroupService {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub async fn create(&self, organization_id: &str, input: CreateGroup) -> Result<Group> {
        input.validate()?;

        let mut groups = self.storage.load_groups(organization_id).await?;
        let group = Group {
            id: new_id(),
            organization_id: organization_id.to_string(),
            name: input.name,
            order: input.order,
            color: input.color,
            created_at: now_micros(),
        };
        groups.push(group.clone());
        self.storage.save_groups(organization_id, &groups).await?;
        Ok(group)
    }

    /// Groups in storage order
    pub async fn get_all(&self, organization_id: &str) -> Result<Vec<Group>> {
        self.storage.load_groups(organization_id).await
    }

    /// Groups in display order (`order` ascending, then name)
    pub async fn get_sorted(&self, organization_id: &str) -> Result<Vec<Group>> {
        let mut groups = self.get_all(organization_id).await?;
        groups.sort_by(Group::display_cmp);
        Ok(groups)
    }

    pub async fn get_by_id(&self, organization_id: &str, id: &str) -> Result<Option<Group>> {
        let groups = self.get_all(organization_id).await?;
        Ok(groups.into_iter().find(|g| g.id == id))
    }

    /// Replaces the organization's groups wholesale
    pub async fn save_all(&self, organization_id: &str, groups: &[Group]) -> Result<()> {
        self.storage.save_groups(organization_id, groups).await
    }

    pub async fn update(&self, organization_id: &str, id: &str, input: UpdateGroup) -> Result<Group> {
        input.validate()?;

        let mut groups = self.get_all(organization_id).await?;
        let group = groups
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| Error::not_found("group", id))?;
        input.apply(group);
        let updated = group.clone();

        self.storage.save_groups(organization_id, &groups).await?;
        Ok(updated)
    }

    /// Deletes a group, its members and their attendance records
    pub async fn delete(&self, organization_id: &str, id: &str) -> Result<()> {
        let mut groups = self.get_all(organization_id).await?;
        let before = groups.len();
        groups.retain(|g| g.id != id);
        if groups.len() == before {
            return Err(Error::not_found("group", id));
        }

        let mut members = self.storage.load_members(organization_id).await?;
        let removed: HashSet<String> = members
            .iter()
            .filter(|m| m.group_id == id)
            .map(|m| m.id.clone())
            .collect();

        if !removed.is_empty() {
            let mut attendances = self.storage.load_attendances(organization_id).await?;
            attendances.retain(|a: &Attendance| !removed.contains(&a.member_id));
            self.storage
                .save_attendances(organization_id, &attendances)
                .await?;

            members.retain(|m: &Member| m.group_id != id);
            self.storage.save_members(organization_id, &members).await?;
        }

        self.storage.save_groups(organization_id, &groups).await?;

        debug!(organization_id, group_id = id, members = removed.len(), "Group deleted");
        Ok(())
    }
}
