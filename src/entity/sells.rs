use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "sells")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub fecha: Date,
    pub id_factura: i64,
    pub customer_id: Uuid,
    pub estado: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customers::Entity",
        from = "Column::CustomerId",
        to = "super::customers::Column::Id"
    )]
    Customers,
    #[sea_orm(has_many = "super::sale_items::Entity")]
    SaleItems,
    #[sea_orm(has_many = "super::sale_services::Entity")]
    SaleServices,
}

impl Related<super::customers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customers.def()
    }
}

impl Related<super::sale_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SaleItems.def()
    }
}

impl Related<super::sale_services::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SaleServices.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
