/// Remote persistence adapter (PostgreSQL)
///
/// Every tenant-scoped statement binds `organization_id` either as a filter
/// or as a payload column; there is no query that reads or writes tenant
/// tables across organizations.
///
/// # Lazy Connection
///
/// The pool is created on first use and cached for the lifetime of the
/// store. A store that is never used never opens a connection.
///
/// # Tenant Tag
///
/// Tenant-scoped calls run inside a transaction that first executes
/// `set_config('app.current_organization_id', $1, true)`, so row-level
/// security policies see the right organization even though pooled
/// connections are shared.
///
/// # Ordering
///
/// Tenant tables carry a `position` column that is not part of any model.
/// `replace_all` writes each record's index into it and `insert` appends
/// after the current last row, so `list` returns records in saved order.
///
/// # Errors
///
/// Failures surface as `StorageError::Remote` with the operation name and
/// the underlying `sqlx::Error`. This layer never retries.

use crate::db::pool::{self, DatabaseConfig};
use crate::error::StorageError;
use crate::models::{Organization, TenantRecord};
use sqlx::{PgPool, Postgres, Transaction};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::debug;

/// Session setting read by the row-level security policies
pub const TENANT_SETTING: &str = "app.current_organization_id";

const ORGANIZATION_COLUMNS: &str = "id, name, description, created_at";

/// PostgreSQL-backed store with a lazily created pool
#[derive(Clone)]
pub struct RemoteStore {
    inner: Arc<RemoteInner>,
}

struct RemoteInner {
    config: DatabaseConfig,
    pool: OnceCell<PgPool>,
}

impl RemoteStore {
    /// Creates a store; no connection is opened until the first call
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            inner: Arc::new(RemoteInner {
                config,
                pool: OnceCell::new(),
            }),
        }
    }

    /// Wraps an existing pool (tests, shared pools)
    pub fn with_pool(pool: PgPool) -> Self {
        Self {
            inner: Arc::new(RemoteInner {
                config: DatabaseConfig::default(),
                pool: OnceCell::new_with(Some(pool)),
            }),
        }
    }

    /// Returns the pool, creating it on first use
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Remote` if the pool cannot be created. A failed
    /// attempt is not cached; the next call tries again.
    pub async fn pool(&self) -> Result<&PgPool, StorageError> {
        self.inner
            .pool
            .get_or_try_init(|| pool::create_pool(self.inner.config.clone()))
            .await
            .map_err(StorageError::remote("connect"))
    }

    /// Pings the database
    pub async fn health_check(&self) -> Result<(), StorageError> {
        let pool = self.pool().await?;
        pool::health_check(pool)
            .await
            .map_err(StorageError::remote("health check"))
    }

    /// Sets the session-level tenant tag on one pooled connection
    pub async fn set_session_tenant(&self, organization_id: &str) -> Result<(), StorageError> {
        let pool = self.pool().await?;
        sqlx::query("SELECT set_config($1, $2, false)")
            .bind(TENANT_SETTING)
            .bind(organization_id)
            .execute(pool)
            .await
            .map_err(StorageError::remote("set tenant context"))?;
        Ok(())
    }

    async fn begin_scoped(
        &self,
        organization_id: &str,
    ) -> Result<Transaction<'static, Postgres>, StorageError> {
        let pool = self.pool().await?;
        let mut tx = pool
            .begin()
            .await
            .map_err(StorageError::remote("begin transaction"))?;

        sqlx::query("SELECT set_config($1, $2, true)")
            .bind(TENANT_SETTING)
            .bind(organization_id)
            .execute(&mut *tx)
            .await
            .map_err(StorageError::remote("set tenant tag"))?;

        Ok(tx)
    }

    // ---- organizations ----

    /// Lists all organizations, newest first
    pub async fn list_organizations(&self) -> Result<Vec<Organization>, StorageError> {
        let pool = self.pool().await?;
        let sql = format!(
            "SELECT {} FROM organizations ORDER BY created_at DESC",
            ORGANIZATION_COLUMNS
        );
        sqlx::query_as::<_, Organization>(&sql)
            .fetch_all(pool)
            .await
            .map_err(StorageError::remote("list organizations"))
    }

    pub async fn find_organization(&self, id: &str) -> Result<Option<Organization>, StorageError> {
        let mut tx = self.begin_scoped(id).await?;
        let sql = format!(
            "SELECT {} FROM organizations WHERE id = $1",
            ORGANIZATION_COLUMNS
        );
        let organization = sqlx::query_as::<_, Organization>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(StorageError::remote("find organization"))?;
        tx.commit()
            .await
            .map_err(StorageError::remote("commit find organization"))?;
        Ok(organization)
    }

    /// Inserts or replaces an organization by id
    pub async fn upsert_organization(&self, organization: &Organization) -> Result<(), StorageError> {
        let mut tx = self.begin_scoped(&organization.id).await?;
        sqlx::query(
            r#"
            INSERT INTO organizations (id, name, description, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE
            SET name = EXCLUDED.name, description = EXCLUDED.description
            "#,
        )
        .bind(&organization.id)
        .bind(&organization.name)
        .bind(&organization.description)
        .bind(organization.created_at)
        .execute(&mut *tx)
        .await
        .map_err(StorageError::remote("upsert organization"))?;
        tx.commit()
            .await
            .map_err(StorageError::remote("commit upsert organization"))?;
        Ok(())
    }

    /// Deletes an organization; returns whether a row was removed
    pub async fn delete_organization(&self, id: &str) -> Result<bool, StorageError> {
        let mut tx = self.begin_scoped(id).await?;
        let result = sqlx::query("DELETE FROM organizations WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(StorageError::remote("delete organization"))?;
        tx.commit()
            .await
            .map_err(StorageError::remote("commit delete organization"))?;
        Ok(result.rows_affected() > 0)
    }

    // ---- tenant collections ----

    /// Lists one organization's records in saved order
    pub async fn list<T: TenantRecord>(&self, organization_id: &str) -> Result<Vec<T>, StorageError> {
        let mut tx = self.begin_scoped(organization_id).await?;
        let sql = format!(
            "SELECT {} FROM {} WHERE organization_id = $1 ORDER BY position ASC, created_at ASC, id ASC",
            T::COLUMNS.join(", "),
            T::TABLE
        );
        let records = sqlx::query_as::<_, T>(&sql)
            .bind(organization_id)
            .fetch_all(&mut *tx)
            .await
            .map_err(StorageError::remote(format!("list {}", T::TABLE)))?;
        tx.commit()
            .await
            .map_err(StorageError::remote(format!("commit list {}", T::TABLE)))?;

        debug!(table = T::TABLE, organization_id, count = records.len(), "Listed remote records");
        Ok(records)
    }

    /// Inserts one record after the organization's current last row
    pub async fn insert<T: TenantRecord>(&self, record: &T) -> Result<(), StorageError> {
        let mut tx = self.begin_scoped(record.organization_id()).await?;
        let sql = insert_sql::<T>();
        record
            .bind_columns(sqlx::query(&sql))
            .execute(&mut *tx)
            .await
            .map_err(StorageError::remote(format!("insert {}", T::TABLE)))?;
        tx.commit()
            .await
            .map_err(StorageError::remote(format!("commit insert {}", T::TABLE)))?;
        Ok(())
    }

    /// Updates a record in place; returns whether a row matched
    pub async fn update<T: TenantRecord>(&self, record: &T) -> Result<bool, StorageError> {
        let mut tx = self.begin_scoped(record.organization_id()).await?;
        let sql = update_sql::<T>();
        let result = record
            .bind_columns(sqlx::query(&sql))
            .execute(&mut *tx)
            .await
            .map_err(StorageError::remote(format!("update {}", T::TABLE)))?;
        tx.commit()
            .await
            .map_err(StorageError::remote(format!("commit update {}", T::TABLE)))?;
        Ok(result.rows_affected() > 0)
    }

    /// Deletes one record; returns whether a row was removed
    pub async fn delete<T: TenantRecord>(
        &self,
        organization_id: &str,
        id: &str,
    ) -> Result<bool, StorageError> {
        let mut tx = self.begin_scoped(organization_id).await?;
        let sql = format!(
            "DELETE FROM {} WHERE organization_id = $1 AND id = $2",
            T::TABLE
        );
        let result = sqlx::query(&sql)
            .bind(organization_id)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(StorageError::remote(format!("delete {}", T::TABLE)))?;
        tx.commit()
            .await
            .map_err(StorageError::remote(format!("commit delete {}", T::TABLE)))?;
        Ok(result.rows_affected() > 0)
    }

    /// Deletes every record of one organization; returns the row count
    pub async fn delete_all<T: TenantRecord>(&self, organization_id: &str) -> Result<u64, StorageError> {
        let mut tx = self.begin_scoped(organization_id).await?;
        let sql = format!("DELETE FROM {} WHERE organization_id = $1", T::TABLE);
        let result = sqlx::query(&sql)
            .bind(organization_id)
            .execute(&mut *tx)
            .await
            .map_err(StorageError::remote(format!("delete all {}", T::TABLE)))?;
        tx.commit()
            .await
            .map_err(StorageError::remote(format!("commit delete all {}", T::TABLE)))?;

        debug!(table = T::TABLE, organization_id, deleted = result.rows_affected(), "Cleared remote records");
        Ok(result.rows_affected())
    }

    /// Makes one organization's rows equal to `records`, in one transaction
    ///
    /// Rows whose id is absent from `records` are deleted; the rest are
    /// upserted. Records must all carry `organization_id`.
    pub async fn replace_all<T: TenantRecord>(
        &self,
        organization_id: &str,
        records: &[T],
    ) -> Result<(), StorageError> {
        let mut tx = self.begin_scoped(organization_id).await?;

        let keep: Vec<String> = records.iter().map(|r| r.id().to_string()).collect();
        let delete_sql = format!(
            "DELETE FROM {} WHERE organization_id = $1 AND NOT (id = ANY($2))",
            T::TABLE
        );
        sqlx::query(&delete_sql)
            .bind(organization_id)
            .bind(keep)
            .execute(&mut *tx)
            .await
            .map_err(StorageError::remote(format!("prune {}", T::TABLE)))?;

        let upsert_sql = upsert_sql::<T>();
        for (position, record) in records.iter().enumerate() {
            record
                .bind_columns(sqlx::query(&upsert_sql))
                .bind(position as i64)
                .execute(&mut *tx)
                .await
                .map_err(StorageError::remote(format!("upsert {}", T::TABLE)))?;
        }

        tx.commit()
            .await
            .map_err(StorageError::remote(format!("commit replace {}", T::TABLE)))?;

        debug!(table = T::TABLE, organization_id, count = records.len(), "Replaced remote records");
        Ok(())
    }
}

impl std::fmt::Debug for RemoteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteStore")
            .field("config", &self.inner.config)
            .field("connected", &self.inner.pool.initialized())
            .finish()
    }
}

fn placeholders(start: usize, count: usize) -> String {
    (start..start + count)
        .map(|n| format!("${}", n))
        .collect::<Vec<_>>()
        .join(", ")
}

fn insert_sql<T: TenantRecord>() -> String {
    format!(
        "INSERT INTO {table} ({columns}, position) VALUES ({values}, \
         (SELECT COALESCE(MAX(position) + 1, 0) FROM {table} WHERE organization_id = $2))",
        table = T::TABLE,
        columns = T::COLUMNS.join(", "),
        values = placeholders(1, T::COLUMNS.len())
    )
}

// COLUMNS[0] is id and COLUMNS[1] is organization_id; both only filter.
// created_at is bound but never rewritten.
fn update_sql<T: TenantRecord>() -> String {
    let assignments = T::COLUMNS
        .iter()
        .enumerate()
        .skip(2)
        .filter(|(_, column)| **column != "created_at")
        .map(|(index, column)| format!("{} = ${}", column, index + 1))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "UPDATE {} SET {} WHERE id = $1 AND organization_id = $2",
        T::TABLE,
        assignments
    )
}

// The position is bound after the record's own columns.
fn upsert_sql<T: TenantRecord>() -> String {
    let position = T::COLUMNS.len() + 1;
    let assignments = T::COLUMNS[2..]
        .iter()
        .filter(|column| **column != "created_at")
        .map(|column| format!("{} = EXCLUDED.{}", column, column))
        .chain(std::iter::once("position = EXCLUDED.position".to_string()))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {table} ({columns}, position) VALUES ({values}) \
         ON CONFLICT (id) DO UPDATE SET {assignments} \
         WHERE {table}.organization_id = EXCLUDED.organization_id",
        table = T::TABLE,
        columns = T::COLUMNS.join(", "),
        values = placeholders(1, position),
        assignments = assignments
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Attendance, Group, Member};

    #[test]
    fn test_insert_sql_appends_after_last_position() {
        assert_eq!(
            insert_sql::<Member>(),
            "INSERT INTO members (id, organization_id, group_id, name, created_at, position) \
             VALUES ($1, $2, $3, $4, $5, \
             (SELECT COALESCE(MAX(position) + 1, 0) FROM members WHERE organization_id = $2))"
        );
    }

    #[test]
    fn test_update_sql_is_scoped_and_keeps_created_at() {
        let sql = update_sql::<Group>();
        assert_eq!(
            sql,
            "UPDATE groups SET name = $3, display_order = $4, color = $5 \
             WHERE id = $1 AND organization_id = $2"
        );
        assert!(!sql.contains("created_at"));
    }

    #[test]
    fn test_upsert_sql_never_moves_rows_between_organizations() {
        let sql = upsert_sql::<Attendance>();
        assert!(sql.starts_with(
            "INSERT INTO attendances (id, organization_id, event_date_id, member_id, status, created_at, position) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)"
        ));
        assert!(sql.contains("ON CONFLICT (id) DO UPDATE SET event_date_id = EXCLUDED.event_date_id"));
        assert!(sql.contains("position = EXCLUDED.position"));
        assert!(sql.ends_with("WHERE attendances.organization_id = EXCLUDED.organization_id"));
        assert!(!sql.contains("created_at = EXCLUDED"));
    }

    #[test]
    fn test_store_is_lazy() {
        let store = RemoteStore::new(DatabaseConfig {
            url: "postgresql://nowhere.invalid/attendly".to_string(),
            ..Default::default()
        });
        assert!(store.inner.pool.get().is_none());
    }
}
