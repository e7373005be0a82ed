use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "bill_plates")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub bill_id: Uuid,
    pub plate_id: Uuid,
    pub quantity: i32,
    /// Plate price in cents when the line was added.
    pub unit_price: i64,
    #[sea_orm(column_type = "Text")]
    pub notes: String,
    pub cooked: bool,
    pub cooked_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bills::Entity",
        from = "Column::BillId",
        to = "super::bills::Column::Id"
    )]
    Bills,
    #[sea_orm(
        belongs_to = "super::plates::Entity",
        from = "Column::PlateId",
        to = "super::plates::Column::Id"
    )]
    Plates,
}

impl Related<super::bills::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bills.def()
    }
}

impl Related<super::plates::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Plates.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
