use sea_orm_migration::prelude::*;

use super::m20251201_000001_create_restaurant_tables::{create, drop_entity};
use crate::entity::Reviews;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20251215_000002_create_reviews"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        create(manager, Reviews).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        drop_entity(manager, Reviews).await
    }
}
