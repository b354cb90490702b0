use sea_orm::entity::prelude::*;

/// A sold stock line. `service_id` is set when the line was consumed by a
/// service rather than sold independently.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "sale_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub sell_id: Uuid,
    pub producto_id: String,
    pub nombre: String,
    pub cantidad: i32,
    pub fecha: Date,
    pub precio_total: i64,
    pub precio_unitario: i64,
    pub service_id: Option<Uuid>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sells::Entity",
        from = "Column::SellId",
        to = "super::sells::Column::Id"
    )]
    Sells,
    #[sea_orm(
        belongs_to = "super::sale_services::Entity",
        from = "Column::ServiceId",
        to = "super::sale_services::Column::Id"
    )]
    SaleServices,
}

impl Related<super::sells::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sells.def()
    }
}

impl Related<super::sale_services::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SaleServices.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
