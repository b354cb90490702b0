use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::SecurityQuestionView;

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetupQuestionsRequest {
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    pub questions: Vec<QuestionEntry>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct QuestionEntry {
    pub question: String,
    pub answer: String,
    #[serde(rename = "isCustom")]
    pub is_custom: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedQuestion {
    pub id: Uuid,
    pub question: String,
    pub order: i16,
    #[serde(rename = "isCustom")]
    pub is_custom: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QuestionSet {
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub questions: Vec<SecurityQuestionView>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ValidateAnswersRequest {
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    pub questions: Vec<AnswerEntry>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AnswerEntry {
    pub id: Uuid,
    pub answer: String,
    pub order: i16,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AnswerFailure {
    pub order: i16,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ValidationSuccess {
    pub validated: bool,
    pub token: String,
    pub expiration: DateTime<Utc>,
}

/// Explicit readout of the recovery flow, derived in one place instead of
/// being inferred from row presence at every call site.
#[derive(Debug, Serialize, PartialEq, ToSchema)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RecoveryState {
    /// No questions configured and no live reset token.
    Idle,
    /// Security questions configured, no live reset token yet.
    QuestionsSet { count: usize },
    /// A reset token is live; the user can complete the reset.
    TokenIssued { expiration: DateTime<Utc> },
}
