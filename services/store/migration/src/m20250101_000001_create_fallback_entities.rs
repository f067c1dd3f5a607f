use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FallbackEntities::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FallbackEntities::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FallbackEntities::TableName).string().not_null())
                    .col(
                        ColumnDef::new(FallbackEntities::PartitionKey)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(FallbackEntities::RowKey).string().not_null())
                    .col(ColumnDef::new(FallbackEntities::Attributes).text().not_null())
                    .col(
                        ColumnDef::new(FallbackEntities::PendingSync)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(FallbackEntities::Deleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(FallbackEntities::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_fallback_entities_identity")
                    .table(FallbackEntities::Table)
                    .col(FallbackEntities::TableName)
                    .col(FallbackEntities::PartitionKey)
                    .col(FallbackEntities::RowKey)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FallbackEntities::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum FallbackEntities {
    Table,
    Id,
    TableName,
    PartitionKey,
    RowKey,
    Attributes,
    PendingSync,
    Deleted,
    UpdatedAt,
}
