use serde::{de::DeserializeOwned, Serialize};
use sqlx::{
    postgres::{PgArguments, PgRow},
    query::Query,
    FromRow, Postgres,
};

/// Query type the remote adapter binds record values into
pub type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

/// A record owned by exactly one organization
///
/// Implementors describe both their local collection name and their remote
/// table layout. `COLUMNS` must start with `id` followed by
/// `organization_id`, and `bind_columns` must bind values in the same order.
pub trait TenantRecord:
    Serialize + DeserializeOwned + Clone + Send + Sync + Unpin + for<'r> FromRow<'r, PgRow> + 'static
{
    /// Collection name used in local store keys (e.g. "groups")
    const COLLECTION: &'static str;

    /// Remote table name
    const TABLE: &'static str;

    /// Remote column names, in bind order
    const COLUMNS: &'static [&'static str];

    fn id(&self) -> &str;

    fn organization_id(&self) -> &str;

    /// Binds every column value, in `COLUMNS` order
    fn bind_columns<'q>(&self, query: PgQuery<'q>) -> PgQuery<'q>;
}
