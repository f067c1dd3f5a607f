#![allow(async_fn_in_trait)]

use tracing::warn;

use crate::error::StoreError;
use crate::infra::codec::Entity;
use crate::infra::filter::Filter;

/// CRUD over one named table, addressed by `(partitionKey, rowKey)`.
pub trait TableStore: Send + Sync {
    fn table_name(&self) -> &str;

    /// `Ok(None)` when the entity does not exist.
    async fn get(&self, partition_key: &str, row_key: &str) -> Result<Option<Entity>, StoreError>;

    async fn list(&self, filter: Option<&Filter>) -> Result<Vec<Entity>, StoreError>;

    /// Fails with [`StoreError::Conflict`] if the identity pair exists.
    async fn insert(&self, entity: &Entity) -> Result<(), StoreError>;

    /// Overwrites an existing entity; [`StoreError::NotFound`] if absent.
    async fn replace(&self, entity: &Entity) -> Result<(), StoreError>;

    /// Idempotent.
    async fn delete(&self, partition_key: &str, row_key: &str) -> Result<(), StoreError>;
}

/// Remote-first table with a local fallback.
///
/// Remote `Unavailable` or `Unauthorized` results are logged and the same
/// operation is answered by the local store. Every other remote result,
/// including `NotFound` and `Conflict`, is returned unchanged.
#[derive(Clone)]
pub struct FallbackStore<R, L> {
    pub remote: R,
    pub local: L,
}

fn degraded(table: &str, operation: &'static str, error: &StoreError) {
    warn!(
        table,
        operation,
        error = %error,
        kind = error.kind(),
        "remote table degraded, using local fallback"
    );
}

impl<R, L> TableStore for FallbackStore<R, L>
where
    R: TableStore,
    L: TableStore,
{
    fn table_name(&self) -> &str {
        self.remote.table_name()
    }

    async fn get(&self, partition_key: &str, row_key: &str) -> Result<Option<Entity>, StoreError> {
        match self.remote.get(partition_key, row_key).await {
            Err(e) if e.is_degradable() => {
                degraded(self.table_name(), "get", &e);
                self.local.get(partition_key, row_key).await
            }
            other => other,
        }
    }

    async fn list(&self, filter: Option<&Filter>) -> Result<Vec<Entity>, StoreError> {
        match self.remote.list(filter).await {
            Err(e) if e.is_degradable() => {
                degraded(self.table_name(), "list", &e);
                self.local.list(filter).await
            }
            other => other,
        }
    }

    async fn insert(&self, entity: &Entity) -> Result<(), StoreError> {
        match self.remote.insert(entity).await {
            Err(e) if e.is_degradable() => {
                degraded(self.table_name(), "insert", &e);
                self.local.insert(entity).await
            }
            other => other,
        }
    }

    async fn replace(&self, entity: &Entity) -> Result<(), StoreError> {
        match self.remote.replace(entity).await {
            Err(e) if e.is_degradable() => {
                degraded(self.table_name(), "replace", &e);
                self.local.replace(entity).await
            }
            other => other,
        }
    }

    async fn delete(&self, partition_key: &str, row_key: &str) -> Result<(), StoreError> {
        match self.remote.delete(partition_key, row_key).await {
            Err(e) if e.is_degradable() => {
                degraded(self.table_name(), "delete", &e);
                self.local.delete(partition_key, row_key).await
            }
            other => other,
        }
    }
}
