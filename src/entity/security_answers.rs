use sea_orm::entity::prelude::*;

/// Only the argon2 hash of the answer is ever stored.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "security_answers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub question_id: Uuid,
    pub answer_hash: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::security_questions::Entity",
        from = "Column::QuestionId",
        to = "super::security_questions::Column::Id"
    )]
    SecurityQuestions,
}

impl Related<super::security_questions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SecurityQuestions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
