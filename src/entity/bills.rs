use sea_orm::entity::prelude::*;

use crate::lifecycle::BillState;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "bills")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    pub table_id: Option<Uuid>,
    pub waiter_id: Option<Uuid>,
    pub state: BillState,
    /// All amounts in cents.
    pub total: i64,
    pub total_paid: i64,
    pub tip_amount: i64,
    /// Hundredths of a percent.
    pub tip_basis_points: i32,
    pub opened_at: DateTimeWithTimeZone,
    pub closed_at: Option<DateTimeWithTimeZone>,
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
        belongs_to = "super::users::Entity",
        from = "Column::WaiterId",
        to = "super::users::Column::Id"
    )]
    Users,
    #[sea_orm(has_many = "super::bill_plates::Entity")]
    BillPlates,
}

impl Related<super::tables::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tables.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::bill_plates::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BillPlates.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
