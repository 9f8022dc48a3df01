use super::{new_id, now_micros};
use crate::error::{Error, Result};
use crate::models::{CreateOrganization, Organization, UpdateOrganization};
use crate::storage::Storage;
use tracing::info;
use validator::Validate;

/// Organization lifecycle, including cascade delete
#[derive(Clone, Debug)]
pub struct OrganizationService {
    storage: Storage,
}

impl OrganizationService {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Creates an organization with a fresh id and timestamp
    ///
    /// # Errors
    ///
    /// - `Error::Validation` if the input is invalid
    /// - `Error::Storage` on backend failure
    pub async fn create(&self, input: CreateOrganization) -> Result<Organization> {
        input.validate()?;

        let organization = Organization {
            id: new_id(),
            name: input.name,
            description: input.description,
            created_at: now_micros(),
        };
        self.storage.save_organization(&organization).await?;

        info!(organization_id = %organization.id, "Organization created");
        Ok(organization)
    }

    /// All organizations, newest first
    pub async fn get_all(&self) -> Result<Vec<Organization>> {
        let mut organizations = self.storage.load_organizations().await?;
        organizations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(organizations)
    }

    /// Looks up one organization; an unknown id is `Ok(None)`
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Organization>> {
        self.storage.load_organization(id).await
    }

    /// Like [`get_by_id`](Self::get_by_id) but absence is `Error::NotFound`
    pub async fn require(&self, id: &str) -> Result<Organization> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found("organization", id))
    }

    /// Shallow-merges `input` over an existing organization
    pub async fn update(&self, id: &str, input: UpdateOrganization) -> Result<Organization> {
        input.validate()?;

        let mut organization = self.require(id).await?;
        input.apply(&mut organization);
        self.storage.save_organization(&organization).await?;
        Ok(organization)
    }

    /// Deletes an organization and every record it owns
    ///
    /// The organization record goes first, then its dependent collections.
    /// A failure while clearing dependents is returned; the organization is
    /// already gone at that point and the leftover records are orphans.
    pub async fn delete(&self, id: &str) -> Result<()> {
        if !self.storage.delete_organization(id).await? {
            return Err(Error::not_found("organization", id));
        }
        self.storage.clear_organization_data(id).await?;

        info!(organization_id = id, "Organization deleted with all dependent data");
        Ok(())
    }
}
