use sea_orm::entity::prelude::*;

/// 1..5 challenge questions per user; (user_id, question_order) is unique.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "security_questions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub question_text: String,
    pub question_order: i16,
    pub is_custom: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
    #[sea_orm(has_many = "super::security_answers::Entity")]
    SecurityAnswers,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::security_answers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SecurityAnswers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
