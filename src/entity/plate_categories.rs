use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "plate_categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub label: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::plates::Entity")]
    Plates,
}

impl Related<super::plates::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Plates.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
