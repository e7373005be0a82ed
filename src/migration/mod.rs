use sea_orm_migration::prelude::*;

mod m20251201_000001_create_restaurant_tables;
mod m20251215_000002_create_reviews;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251201_000001_create_restaurant_tables::Migration),
            Box::new(m20251215_000002_create_reviews::Migration),
        ]
    }
}
