use sea_orm::{EntityTrait, Schema};
use sea_orm_migration::prelude::*;

use crate::entity::{
    AuditLogs, BillPlates, Bills, PlateCategories, Plates, Reservations, TableAreas, Tables, Users,
};

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20251201_000001_create_restaurant_tables"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Referenced tables first; Postgres checks foreign keys at creation.
        create(manager, Users).await?;
        create(manager, TableAreas).await?;
        create(manager, Tables).await?;
        create(manager, PlateCategories).await?;
        create(manager, Plates).await?;
        create(manager, Reservations).await?;
        create(manager, Bills).await?;
        create(manager, BillPlates).await?;
        create(manager, AuditLogs).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        drop_entity(manager, AuditLogs).await?;
        drop_entity(manager, BillPlates).await?;
        drop_entity(manager, Bills).await?;
        drop_entity(manager, Reservations).await?;
        drop_entity(manager, Plates).await?;
        drop_entity(manager, PlateCategories).await?;
        drop_entity(manager, Tables).await?;
        drop_entity(manager, TableAreas).await?;
        drop_entity(manager, Users).await?;
        Ok(())
    }
}

pub(super) async fn create<E: EntityTrait>(manager: &SchemaManager<'_>, entity: E) -> Result<(), DbErr> {
    let schema = Schema::new(manager.get_database_backend());
    manager
        .create_table(schema.create_table_from_entity(entity).if_not_exists().to_owned())
        .await
}

pub(super) async fn drop_entity<E: EntityTrait>(manager: &SchemaManager<'_>, entity: E) -> Result<(), DbErr> {
    manager
        .drop_table(Table::drop().table(entity).if_exists().to_owned())
        .await
}
