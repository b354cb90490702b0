use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "suppliers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub nombre: String,
    pub razon_social: Option<String>,
    pub rif: Option<String>,
    pub cargo: Option<String>,
    pub telefono: Option<String>,
    pub email: Option<String>,
    pub webrrss: Option<String>,
    pub productos: Option<String>,
    pub servicios: Option<String>,
    pub fecha_registro: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::stocks::Entity")]
    Stocks,
}

impl Related<super::stocks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Stocks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
