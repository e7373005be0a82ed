use sea_orm::entity::prelude::*;

use crate::lifecycle::ReservationState;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "reservations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    pub name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub date_time: DateTimeWithTimeZone,
    pub table_area_id: Option<Uuid>,
    pub table_id: Option<Uuid>,
    pub amount_people: i32,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub state: ReservationState,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tables::Entity",
        from = "Column::TableId",
        to = "super::tables::Column::Id"
    )]
    Tables,
    #[sea_orm(
        belongs_to = "super::table_areas::Entity",
        from = "Column::TableAreaId",
        to = "super::table_areas::Column::Id"
    )]
    TableAreas,
}

impl Related<super::tables::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tables.def()
    }
}

impl Related<super::table_areas::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TableAreas.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
