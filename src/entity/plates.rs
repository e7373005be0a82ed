use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "plates")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    /// Cents.
    pub price: i64,
    pub category_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::plate_categories::Entity",
        from = "Column::CategoryId",
        to = "super::plate_categories::Column::Id"
    )]
    PlateCategories,
    #[sea_orm(has_many = "super::bill_plates::Entity")]
    BillPlates,
}

impl Related<super::plate_categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PlateCategories.def()
    }
}

impl Related<super::bill_plates::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BillPlates.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
