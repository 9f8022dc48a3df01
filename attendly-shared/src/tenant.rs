/// Tenant context
///
/// Tracks which organization is currently active and, on the remote
/// backend, tags the database session with it so row-level security
/// policies keyed on `app.current_organization_id` can filter server-side.
///
/// # Semantics
///
/// - `set_active_organization` is idempotent and never fails: remote errors
///   are logged and dropped. On the local backend it only records the id.
/// - The context is shared by every clone and mutated only by explicit
///   calls. Only one organization can be active at a time; switching while
///   another organization's request is in flight lets that request observe
///   the new tag.
///
/// Remote storage calls also set the tag per transaction, so data scoping
/// does not depend on the session-level tag being current.
///
/// # Example
///
/// ```no_run
/// use attendly_shared::storage::Storage;
/// use attendly_shared::tenant::TenantContext;
///
/// # async fn example(storage: Storage) {
/// let tenant = TenantContext::new(&storage);
/// tenant.set_active_organization("org123").await;
/// assert_eq!(tenant.active_organization().as_deref(), Some("org123"));
/// # }
/// ```

use crate::storage::{remote::RemoteStore, Storage};
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

#[derive(Clone, Debug)]
pub struct TenantContext {
    active: Arc<RwLock<Option<String>>>,
    remote: Option<RemoteStore>,
}

impl TenantContext {
    pub fn new(storage: &Storage) -> Self {
        Self {
            active: Arc::new(RwLock::new(None)),
            remote: storage.remote_store().cloned(),
        }
    }

    /// Makes `organization_id` the active tenant
    pub async fn set_active_organization(&self, organization_id: &str) {
        {
            let mut active = self.active.write().unwrap_or_else(|e| e.into_inner());
            if active.as_deref() != Some(organization_id) {
                debug!(organization_id, "Switching active organization");
            }
            *active = Some(organization_id.to_string());
        }

        if let Some(remote) = &self.remote {
            if let Err(e) = remote.set_session_tenant(organization_id).await {
                warn!(organization_id, error = %e, "Failed to set remote tenant context");
            }
        }
    }

    /// The currently active organization, if any
    pub fn active_organization(&self) -> Option<String> {
        self.active
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Forgets the active organization
    pub fn clear(&self) {
        *self.active.write().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::pool::DatabaseConfig;
    use crate::storage::local::LocalStore;

    #[tokio::test]
    async fn test_local_context_records_active_organization() {
        let tenant = TenantContext::new(&Storage::in_memory());
        assert!(tenant.active_organization().is_none());

        tenant.set_active_organization("a").await;
        tenant.set_active_organization("a").await;
        assert_eq!(tenant.active_organization().as_deref(), Some("a"));

        tenant.set_active_organization("b").await;
        assert_eq!(tenant.active_organization().as_deref(), Some("b"));

        tenant.clear();
        assert!(tenant.active_organization().is_none());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let tenant = TenantContext::new(&Storage::in_memory());
        let clone = tenant.clone();
        clone.set_active_organization("shared").await;
        assert_eq!(tenant.active_organization().as_deref(), Some("shared"));
    }

    #[tokio::test]
    async fn test_remote_failure_is_swallowed() {
        let remote = RemoteStore::new(DatabaseConfig {
            url: "not a url".to_string(),
            ..Default::default()
        });
        let storage = Storage::remote(remote, LocalStore::in_memory());
        let tenant = TenantContext::new(&storage);

        tenant.set_active_organization("org").await;
        assert_eq!(tenant.active_organization().as_deref(), Some("org"));
    }
}
