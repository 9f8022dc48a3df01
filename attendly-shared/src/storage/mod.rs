/// Unified storage facade
///
/// [`Storage`] exposes one asynchronous CRUD surface over either the local
/// key-value adapter or the remote PostgreSQL adapter. The backend is picked
/// once from [`StorageConfig`] when the facade is built and never changes for
/// that instance.
///
/// Every operation is `async` even when the local adapter does the work, so
/// callers are backend-agnostic.
///
/// # Example
///
/// ```no_run
/// use attendly_shared::config::StorageConfig;
/// use attendly_shared::storage::Storage;
///
/// # async fn example() -> attendly_shared::Result<()> {
/// let storage = Storage::new(&StorageConfig::default())?;
///
/// let groups = storage.load_groups("org123").await?;
/// storage.save_groups("org123", &groups).await?;
/// # Ok(())
/// # }
/// ```

pub mod local;
pub mod remote;

use crate::config::{BackendKind, StorageConfig};
use crate::error::Result;
use crate::models::{Attendance, EventDate, Group, Member, Organization, TenantRecord};
use local::{collection_key, FileStore, LocalStore, ORGANIZATIONS_KEY};
use remote::RemoteStore;
use tracing::{debug, info};

/// Backend-agnostic storage handle
///
/// Cloning is cheap; clones share the same backend.
#[derive(Clone, Debug)]
pub struct Storage {
    kind: BackendKind,
    local: LocalStore,
    remote: Option<RemoteStore>,
}

impl Storage {
    /// Builds the facade selected by `config`
    ///
    /// The local store is always available (the legacy migration engine
    /// reads it): files under `data_dir` when set, memory otherwise.
    ///
    /// # Errors
    ///
    /// - `Error::Configuration` if the remote backend is selected without
    ///   endpoint or credential
    /// - `Error::Storage` if the local data directory cannot be created
    pub fn new(config: &StorageConfig) -> Result<Self> {
        let local = match &config.data_dir {
            Some(dir) => LocalStore::new(FileStore::open(dir)?),
            None => LocalStore::in_memory(),
        };

        let kind = config.backend_kind();
        let remote = match kind {
            BackendKind::Remote => Some(RemoteStore::new(config.database_config()?)),
            BackendKind::Local => None,
        };

        info!(backend = %kind, "Storage backend selected");
        Ok(Self {
            kind,
            local,
            remote,
        })
    }

    /// Builds a local-backed facade over an existing store
    pub fn local(local: LocalStore) -> Self {
        Self {
            kind: BackendKind::Local,
            local,
            remote: None,
        }
    }

    /// Builds a local-backed facade over a fresh in-memory store
    pub fn in_memory() -> Self {
        Self::local(LocalStore::in_memory())
    }

    /// Builds a remote-backed facade; `local` still serves the migration engine
    pub fn remote(remote: RemoteStore, local: LocalStore) -> Self {
        Self {
            kind: BackendKind::Remote,
            local,
            remote: Some(remote),
        }
    }

    pub fn backend(&self) -> BackendKind {
        self.kind
    }

    /// The local store, regardless of which backend serves requests
    pub fn local_store(&self) -> &LocalStore {
        &self.local
    }

    /// The remote store when the remote backend is selected
    pub fn remote_store(&self) -> Option<&RemoteStore> {
        self.remote.as_ref()
    }

    /// Checks that the active backend is reachable
    pub async fn health_check(&self) -> Result<()> {
        if let Some(remote) = &self.remote {
            remote.health_check().await?;
        }
        Ok(())
    }

    // ---- organizations ----

    /// Loads every organization, in backend order
    pub async fn load_organizations(&self) -> Result<Vec<Organization>> {
        match &self.remote {
            Some(remote) => Ok(remote.list_organizations().await?),
            None => Ok(self.local.load(ORGANIZATIONS_KEY)?),
        }
    }

    /// Loads one organization; absence is `Ok(None)`
    pub async fn load_organization(&self, id: &str) -> Result<Option<Organization>> {
        match &self.remote {
            Some(remote) => Ok(remote.find_organization(id).await?),
            None => {
                let organizations: Vec<Organization> = self.local.load(ORGANIZATIONS_KEY)?;
                Ok(organizations.into_iter().find(|o| o.id == id))
            }
        }
    }

    /// Inserts or replaces an organization by id
    pub async fn save_organization(&self, organization: &Organization) -> Result<()> {
        match &self.remote {
            Some(remote) => remote.upsert_organization(organization).await?,
            None => {
                let mut organizations: Vec<Organization> = self.local.load(ORGANIZATIONS_KEY)?;
                match organizations.iter_mut().find(|o| o.id == organization.id) {
                    Some(existing) => *existing = organization.clone(),
                    None => organizations.push(organization.clone()),
                }
                self.local.save(ORGANIZATIONS_KEY, &organizations)?;
            }
        }
        Ok(())
    }

    /// Deletes an organization record only; returns whether it existed
    ///
    /// Dependent collections are removed by [`Storage::clear_organization_data`].
    pub async fn delete_organization(&self, id: &str) -> Result<bool> {
        match &self.remote {
            Some(remote) => Ok(remote.delete_organization(id).await?),
            None => {
                let mut organizations: Vec<Organization> = self.local.load(ORGANIZATIONS_KEY)?;
                let before = organizations.len();
                organizations.retain(|o| o.id != id);
                let removed = organizations.len() != before;
                if removed {
                    self.local.save(ORGANIZATIONS_KEY, &organizations)?;
                }
                Ok(removed)
            }
        }
    }

    // ---- tenant collections ----

    /// Loads one organization's collection of `T`
    pub async fn load<T: TenantRecord>(&self, organization_id: &str) -> Result<Vec<T>> {
        match &self.remote {
            Some(remote) => Ok(remote.list::<T>(organization_id).await?),
            None => Ok(self
                .local
                .load(&collection_key(T::COLLECTION, organization_id))?),
        }
    }

    /// Replaces one organization's collection of `T` with `records`
    pub async fn save_all<T: TenantRecord>(&self, organization_id: &str, records: &[T]) -> Result<()> {
        match &self.remote {
            Some(remote) => remote.replace_all(organization_id, records).await?,
            None => self
                .local
                .save(&collection_key(T::COLLECTION, organization_id), records)?,
        }
        Ok(())
    }

    async fn clear<T: TenantRecord>(&self, organization_id: &str) -> Result<()> {
        match &self.remote {
            Some(remote) => {
                remote.delete_all::<T>(organization_id).await?;
            }
            None => self
                .local
                .clear(&collection_key(T::COLLECTION, organization_id))?,
        }
        Ok(())
    }

    /// Removes all four dependent collections of an organization
    ///
    /// Collections are removed children-first. The first failure is returned
    /// immediately; collections already removed stay removed.
    pub async fn clear_organization_data(&self, organization_id: &str) -> Result<()> {
        self.clear::<Attendance>(organization_id).await?;
        self.clear::<Member>(organization_id).await?;
        self.clear::<EventDate>(organization_id).await?;
        self.clear::<Group>(organization_id).await?;

        debug!(organization_id, backend = %self.kind, "Cleared organization data");
        Ok(())
    }

    pub async fn load_event_dates(&self, organization_id: &str) -> Result<Vec<EventDate>> {
        self.load(organization_id).await
    }

    pub async fn save_event_dates(&self, organization_id: &str, records: &[EventDate]) -> Result<()> {
        self.save_all(organization_id, records).await
    }

    pub async fn load_groups(&self, organization_id: &str) -> Result<Vec<Group>> {
        self.load(organization_id).await
    }

    pub async fn save_groups(&self, organization_id: &str, records: &[Group]) -> Result<()> {
        self.save_all(organization_id, records).await
    }

    pub async fn load_members(&self, organization_id: &str) -> Result<Vec<Member>> {
        self.load(organization_id).await
    }

    pub async fn save_members(&self, organization_id: &str, records: &[Member]) -> Result<()> {
        self.save_all(organization_id, records).await
    }

    pub async fn load_attendances(&self, organization_id: &str) -> Result<Vec<Attendance>> {
        self.load(organization_id).await
    }

    pub async fn save_attendances(&self, organization_id: &str, records: &[Attendance]) -> Result<()> {
        self.save_all(organization_id, records).await
    }
}
