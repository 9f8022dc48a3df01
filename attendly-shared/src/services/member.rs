use super::{field_error, new_id, now_micros};
use crate::error::{Error, Result};
use crate::models::{CreateMember, Member, UpdateMember};
use crate::storage::Storage;
use validator::Validate;

#[derive(Clone, Debug)]
pub struct MemberService {
    storage: Storage,
}

impl MemberService {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Rejects a group id that does not exist in this organization
    async fn ensure_group(&self, organization_id: &str, group_id: &str) -> Result<()> {
        let groups = self.storage.load_groups(organization_id).await?;
        if groups.iter().any(|g| g.id == group_id) {
            Ok(())
        } else {
            Err(field_error("groupId", "unknown_group", "Group does not exist in this organization").into())
        }
    }

    pub async fn create(&self, organization_id: &str, input: CreateMember) -> Result<Member> {
        input.validate()?;
        self.ensure_group(organization_id, &input.group_id).await?;

        let mut members = self.storage.load_members(organization_id).await?;
        let member = Member {
            id: new_id(),
            organization_id: organization_id.to_string(),
            group_id: input.group_id,
            name: input.name,
            created_at: now_micros(),
        };
        members.push(member.clone());
        self.storage.save_members(organization_id, &members).await?;
        Ok(member)
    }

    /// Members in storage order
    pub async fn get_all(&self, organization_id: &str) -> Result<Vec<Member>> {
        self.storage.load_members(organization_id).await
    }

    pub async fn get_by_group(&self, organization_id: &str, group_id: &str) -> Result<Vec<Member>> {
        let members = self.get_all(organization_id).await?;
        Ok(members.into_iter().filter(|m| m.group_id == group_id).collect())
    }

    pub async fn get_by_id(&self, organization_id: &str, id: &str) -> Result<Option<Member>> {
        let members = self.get_all(organization_id).await?;
        Ok(members.into_iter().find(|m| m.id == id))
    }

    pub async fn update(&self, organization_id: &str, id: &str, input: UpdateMember) -> Result<Member> {
        input.validate()?;

        let mut members = self.get_all(organization_id).await?;
        let position = members
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| Error::not_found("member", id))?;

        if let Some(group_id) = &input.group_id {
            self.ensure_group(organization_id, group_id).await?;
        }

        input.apply(&mut members[position]);
        let updated = members[position].clone();

        self.storage.save_members(organization_id, &members).await?;
        Ok(updated)
    }

    /// Deletes a member and their attendance records
    pub async fn delete(&self, organization_id: &str, id: &str) -> Result<()> {
        let mut members = self.get_all(organization_id).await?;
        let before = members.len();
        members.retain(|m| m.id != id);
        if members.len() == before {
            return Err(Error::not_found("member", id));
        }

        let mut attendances = self.storage.load_attendances(organization_id).await?;
        let attendance_count = attendances.len();
        attendances.retain(|a| a.member_id != id);
        if attendances.len() != attendance_count {
            self.storage
                .save_attendances(organization_id, &attendances)
                .await?;
        }

        self.storage.save_members(organization_id, &members).await?;
        Ok(())
    }
}
