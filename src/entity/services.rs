use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "services")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub servicio: String,
    pub descripcion: Option<String>,
    pub precio: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::sale_services::Entity")]
    SaleServices,
}

impl Related<super::sale_services::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SaleServices.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
