//! SQLite-backed local fallback store.
//!
//! Holds the same `(table, partitionKey, rowKey)` entities as the remote
//! service. Every write is flagged `pending_sync` and deletes leave tombstones,
//! so an operator can replay them once the remote table is reachable again.

use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectOptions, Database,
    DatabaseConnection, EntityTrait, IntoActiveModel as _, QueryFilter, QueryOrder,
};
use sea_orm_migration::MigratorTrait as _;
use serde_json::{Map, Value};

use campus_store_migration::Migrator;
use campus_store_schema::fallback_entities;

use crate::error::StoreError;
use crate::infra::codec::Entity;
use crate::infra::filter::Filter;
use crate::infra::store::TableStore;

#[derive(Clone)]
pub struct LocalStore {
    db: DatabaseConnection,
}

/// A local write not yet replayed to the remote table.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingWrite {
    pub id: i32,
    pub table: String,
    pub entity: Entity,
    pub deleted: bool,
}

impl LocalStore {
    /// Open (or create) the database at `url` and apply migrations.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let mut options = ConnectOptions::new(url.to_owned());
        options
            .max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);
        let db = Database::connect(options)
            .await
            .context("connect local store")?;
        Migrator::up(&db, None)
            .await
            .context("migrate local store")?;
        Ok(Self { db })
    }

    pub async fn in_memory() -> Result<Self, StoreError> {
        Self::connect("sqlite::memory:").await
    }

    /// Round trip to the database file.
    pub async fn ping(&self) -> Result<(), StoreError> {
        self.db.ping().await.context("ping local store")?;
        Ok(())
    }

    pub fn table(&self, name: &str) -> LocalTable {
        LocalTable {
            db: self.db.clone(),
            table: name.to_owned(),
        }
    }

    /// Pending writes across all tables, oldest first.
    pub async fn pending(&self) -> Result<Vec<PendingWrite>, StoreError> {
        let rows = fallback_entities::Entity::find()
            .filter(fallback_entities::Column::PendingSync.eq(true))
            .order_by_asc(fallback_entities::Column::Id)
            .all(&self.db)
            .await
            .context("list pending local writes")?;
        rows.into_iter()
            .map(|row| {
                Ok(PendingWrite {
                    id: row.id,
                    table: row.table_name.clone(),
                    deleted: row.deleted,
                    entity: to_entity(row)?,
                })
            })
            .collect()
    }

    /// Clear the pending flag once a write reached the remote table.
    /// Replayed tombstones are removed.
    pub async fn mark_synced(&self, id: i32) -> Result<(), StoreError> {
        let Some(row) = fallback_entities::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find pending local write")?
        else {
            return Ok(());
        };
        if row.deleted {
            fallback_entities::Entity::delete_by_id(id)
                .exec(&self.db)
                .await
                .context("drop replayed tombstone")?;
        } else {
            let mut active = row.into_active_model();
            active.pending_sync = Set(false);
            active
                .update(&self.db)
                .await
                .context("mark local write synced")?;
        }
        Ok(())
    }
}

/// One table inside the local store.
#[derive(Clone)]
pub struct LocalTable {
    db: DatabaseConnection,
    table: String,
}

impl LocalTable {
    async fn find_row(
        &self,
        partition_key: &str,
        row_key: &str,
    ) -> Result<Option<fallback_entities::Model>, StoreError> {
        Ok(fallback_entities::Entity::find()
            .filter(fallback_entities::Column::TableName.eq(self.table.as_str()))
            .filter(fallback_entities::Column::PartitionKey.eq(partition_key))
            .filter(fallback_entities::Column::RowKey.eq(row_key))
            .one(&self.db)
            .await
            .context("find local entity")?)
    }

    async fn overwrite(
        &self,
        row: fallback_entities::Model,
        attributes: String,
        deleted: bool,
    ) -> Result<(), StoreError> {
        let mut active = row.into_active_model();
        active.attributes = Set(attributes);
        active.deleted = Set(deleted);
        active.pending_sync = Set(true);
        active.updated_at = Set(Utc::now());
        active
            .update(&self.db)
            .await
            .context("update local entity")?;
        Ok(())
    }

    async fn create(
        &self,
        partition_key: &str,
        row_key: &str,
        attributes: String,
        deleted: bool,
    ) -> Result<(), StoreError> {
        fallback_entities::ActiveModel {
            table_name: Set(self.table.clone()),
            partition_key: Set(partition_key.to_owned()),
            row_key: Set(row_key.to_owned()),
            attributes: Set(attributes),
            pending_sync: Set(true),
            deleted: Set(deleted),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .context("insert local entity")?;
        Ok(())
    }
}

fn serialize_attributes(entity: &Entity) -> Result<String, StoreError> {
    Ok(serde_json::to_string(&entity.attributes).context("serialize local attributes")?)
}

fn to_entity(row: fallback_entities::Model) -> Result<Entity, StoreError> {
    let attributes: Map<String, Value> =
        serde_json::from_str(&row.attributes).context("parse local attributes")?;
    Ok(Entity {
        partition_key: row.partition_key,
        row_key: row.row_key,
        attributes,
    })
}

impl TableStore for LocalTable {
    fn table_name(&self) -> &str {
        &self.table
    }

    async fn get(&self, partition_key: &str, row_key: &str) -> Result<Option<Entity>, StoreError> {
        match self.find_row(partition_key, row_key).await? {
            Some(row) if !row.deleted => to_entity(row).map(Some),
            _ => Ok(None),
        }
    }

    async fn list(&self, filter: Option<&Filter>) -> Result<Vec<Entity>, StoreError> {
        let rows = fallback_entities::Entity::find()
            .filter(fallback_entities::Column::TableName.eq(self.table.as_str()))
            .filter(fallback_entities::Column::Deleted.eq(false))
            .order_by_asc(fallback_entities::Column::Id)
            .all(&self.db)
            .await
            .context("list local entities")?;
        let mut entities = Vec::with_capacity(rows.len());
        for row in rows {
            let entity = to_entity(row)?;
            if filter.is_none_or(|f| f.matches(&entity)) {
                entities.push(entity);
            }
        }
        Ok(entities)
    }

    async fn insert(&self, entity: &Entity) -> Result<(), StoreError> {
        let attributes = serialize_attributes(entity)?;
        match self.find_row(&entity.partition_key, &entity.row_key).await? {
            Some(row) if !row.deleted => Err(StoreError::Conflict),
            Some(tombstone) => self.overwrite(tombstone, attributes, false).await,
            None => {
                self.create(&entity.partition_key, &entity.row_key, attributes, false)
                    .await
            }
        }
    }

    async fn replace(&self, entity: &Entity) -> Result<(), StoreError> {
        let attributes = serialize_attributes(entity)?;
        match self.find_row(&entity.partition_key, &entity.row_key).await? {
            Some(row) if !row.deleted => self.overwrite(row, attributes, false).await,
            _ => Err(StoreError::NotFound),
        }
    }

    async fn delete(&self, partition_key: &str, row_key: &str) -> Result<(), StoreError> {
        match self.find_row(partition_key, row_key).await? {
            Some(row) if !row.deleted => self.overwrite(row, "{}".to_owned(), true).await,
            Some(_) => Ok(()),
            // The entity may exist remotely only; keep a tombstone for replay.
            None => self.create(partition_key, row_key, "{}".to_owned(), true).await,
        }
    }
}
