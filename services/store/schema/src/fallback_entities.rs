use sea_orm::entity::prelude::*;

/// One entity written to the local fallback store.
///
/// `id` follows first insertion, which gives each table its list order.
/// Deleted entities stay as tombstones until replayed to the remote table.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "fallback_entities")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub table_name: String,
    pub partition_key: String,
    pub row_key: String,
    /// JSON object of attributes, identity keys excluded.
    #[sea_orm(column_type = "Text")]
    pub attributes: String,
    pub pending_sync: bool,
    pub deleted: bool,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
