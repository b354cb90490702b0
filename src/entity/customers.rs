use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub cedula: String,
    pub cliente: String,
    pub email: String,
    pub telefono: Option<String>,
    pub rif: Option<String>,
    pub empresa: Option<String>,
    pub direccion: Option<String>,
    pub ciudad: Option<String>,
    pub provincia: Option<String>,
    pub pais: Option<String>,
    pub nrocasa: Option<String>,
    pub fecha_registro: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::sells::Entity")]
    Sells,
}

impl Related<super::sells::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sells.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
