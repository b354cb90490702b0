//! Password recovery: mailed reset links and the security-question challenge.
//!
//! Reset tokens are single-use and live for one hour. A user has at most one
//! live reset token; issuing a new one deletes whatever was there before.
//! Security answers are stored as argon2 hashes of the normalized answer,
//! never as plaintext.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    dto::{
        auth::{RequestPasswordReset, ResetPasswordRequest},
        security::{
            AnswerFailure, CreatedQuestion, QuestionSet, RecoveryState, SetupQuestionsRequest,
            ValidateAnswersRequest, ValidationSuccess,
        },
    },
    entity::{
        password_reset_tokens::{
            ActiveModel as ResetTokenActive, Column as ResetTokenCol, Entity as ResetTokens,
        },
        security_answers::{
            ActiveModel as AnswerActive, Column as AnswerCol, Entity as Answers,
        },
        security_questions::{
            ActiveModel as QuestionActive, Column as QuestionCol, Entity as Questions,
        },
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    models::{SecurityQuestionView, UserPublic},
    response::{ApiResponse, Meta},
    services::user_service::{generate_token, hash_password, user_public_from_entity, verify_password},
    state::AppState,
};

const RESET_TOKEN_HOURS: i64 = 1;
const MAX_QUESTIONS: usize = 5;

/// Mail a reset link to the account's address. The old token (if any) is
/// gone the moment the new one exists.
pub async fn request_reset(
    state: &AppState,
    payload: RequestPasswordReset,
) -> AppResult<ApiResponse<UserPublic>> {
    let user = Users::find()
        .filter(UserCol::Email.eq(payload.email.as_str()))
        .one(&state.orm)
        .await?;
    let user = match user {
        Some(u) => u,
        None => return Err(AppError::NotFound),
    };

    if user.status != crate::services::user_service::STATUS_VALIDATED {
        return Err(AppError::Unauthorized(
            "La cuenta no ha sido activada. Revisa tu correo".into(),
        ));
    }

    let token = generate_token();
    let expiration = Utc::now() + Duration::hours(RESET_TOKEN_HOURS);

    let txn = state.orm.begin().await?;

    ResetTokens::delete_many()
        .filter(ResetTokenCol::UserId.eq(user.id))
        .exec(&txn)
        .await?;

    ResetTokenActive {
        id: Set(Uuid::new_v4()),
        token: Set(token.clone()),
        expiration: Set(expiration.fixed_offset()),
        user_id: Set(user.id),
    }
    .insert(&txn)
    .await?;

    state
        .mailer
        .send_password_reset_email(&user.username, &user.email, &token)
        .await
        .map_err(AppError::Internal)?;

    txn.commit().await?;

    tracing::info!(user_id = %user.id, "password reset requested");

    Ok(ApiResponse::success(
        "Correo de restablecimiento enviado",
        user_public_from_entity(user),
        Some(Meta::empty()),
    ))
}

/// Redeem a reset token: rehash the password and burn every reset token the
/// user holds, in one transaction.
pub async fn reset_password(
    state: &AppState,
    payload: ResetPasswordRequest,
) -> AppResult<ApiResponse<UserPublic>> {
    if payload.new_password.len() < 6 {
        return Err(AppError::BadRequest(
            "La contraseña debe tener al menos 6 caracteres".into(),
        ));
    }

    let txn = state.orm.begin().await?;

    let row = ResetTokens::find()
        .filter(ResetTokenCol::Token.eq(payload.token.as_str()))
        .one(&txn)
        .await?;
    let row = match row {
        Some(r) => r,
        None => return Err(AppError::BadRequest("Token inválido".into())),
    };

    if row.expiration.with_timezone(&Utc) < Utc::now() {
        ResetTokens::delete_by_id(row.id).exec(&txn).await?;
        txn.commit().await?;
        return Err(AppError::BadRequest("El token ha expirado".into()));
    }

    let user = Users::find_by_id(row.user_id).one(&txn).await?;
    let user = match user {
        Some(u) => u,
        None => return Err(AppError::NotFound),
    };

    let user_id = user.id;
    let mut active: UserActive = user.into();
    active.password_hash = Set(hash_password(&payload.new_password)?);
    let user = active.update(&txn).await?;

    ResetTokens::delete_many()
        .filter(ResetTokenCol::UserId.eq(user_id))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    tracing::info!(user_id = %user_id, "password reset completed");

    Ok(ApiResponse::success(
        "Contraseña restablecida",
        user_public_from_entity(user),
        Some(Meta::empty()),
    ))
}

/// Replace the user's challenge set wholesale. Orders are assigned from the
/// payload position, 1-based; answers are normalized then hashed.
pub async fn setup_questions(
    state: &AppState,
    payload: SetupQuestionsRequest,
) -> AppResult<ApiResponse<Vec<CreatedQuestion>>> {
    if payload.questions.is_empty() || payload.questions.len() > MAX_QUESTIONS {
        return Err(AppError::BadRequest(format!(
            "Se requieren entre 1 y {MAX_QUESTIONS} preguntas"
        )));
    }
    for (idx, entry) in payload.questions.iter().enumerate() {
        if entry.question.trim().is_empty() || entry.answer.trim().is_empty() {
            return Err(AppError::BadRequest(format!(
                "La pregunta {} debe tener texto y respuesta",
                idx + 1
            )));
        }
    }

    let user = Users::find_by_id(payload.user_id).one(&state.orm).await?;
    if user.is_none() {
        return Err(AppError::BadRequest(format!(
            "No existe un usuario con el ID {}",
            payload.user_id
        )));
    }

    let txn = state.orm.begin().await?;

    // Old questions go first; answers follow via ON DELETE CASCADE.
    Questions::delete_many()
        .filter(QuestionCol::UserId.eq(payload.user_id))
        .exec(&txn)
        .await?;

    let mut created = Vec::with_capacity(payload.questions.len());
    for (idx, entry) in payload.questions.iter().enumerate() {
        let order = (idx + 1) as i16;
        let question = QuestionActive {
            id: Set(Uuid::new_v4()),
            user_id: Set(payload.user_id),
            question_text: Set(entry.question.trim().to_string()),
            question_order: Set(order),
            is_custom: Set(entry.is_custom),
            created_at: Set(Utc::now().fixed_offset()),
        }
        .insert(&txn)
        .await?;

        AnswerActive {
            id: Set(Uuid::new_v4()),
            question_id: Set(question.id),
            answer_hash: Set(hash_password(&normalize_answer(&entry.answer))?),
            created_at: Set(Utc::now().fixed_offset()),
        }
        .insert(&txn)
        .await?;

        created.push(CreatedQuestion {
            id: question.id,
            question: question.question_text,
            order,
            is_custom: question.is_custom,
        });
    }

    txn.commit().await?;

    tracing::info!(user_id = %payload.user_id, count = created.len(), "security questions configured");

    Ok(ApiResponse::success(
        "Preguntas de seguridad configuradas",
        created,
        Some(Meta::empty()),
    ))
}

pub async fn get_questions(state: &AppState, user_id: Uuid) -> AppResult<ApiResponse<QuestionSet>> {
    let questions = fetch_question_views(state, user_id).await?;
    if questions.is_empty() {
        return Err(AppError::BadRequest(
            "El usuario no tiene preguntas de seguridad configuradas".into(),
        ));
    }

    Ok(ApiResponse::success(
        "Ok",
        QuestionSet {
            user_id,
            email: None,
            questions,
        },
        Some(Meta::empty()),
    ))
}

pub async fn get_questions_by_email(
    state: &AppState,
    email: &str,
) -> AppResult<ApiResponse<QuestionSet>> {
    let user = Users::find()
        .filter(UserCol::Email.eq(email))
        .one(&state.orm)
        .await?;
    let user = match user {
        Some(u) => u,
        None => {
            return Err(AppError::BadRequest(
                "No existe un usuario registrado con ese correo".into(),
            ));
        }
    };

    let questions = fetch_question_views(state, user.id).await?;
    if questions.is_empty() {
        return Err(AppError::BadRequest(
            "El usuario no tiene preguntas de seguridad configuradas".into(),
        ));
    }

    Ok(ApiResponse::success(
        "Ok",
        QuestionSet {
            user_id: user.id,
            email: Some(user.email),
            questions,
        },
        Some(Meta::empty()),
    ))
}

/// All-or-nothing answer check. Every submitted answer must match the stored
/// hash AND carry the stored order; any miss rejects the batch without
/// revealing which stored answers exist beyond the submitted ids. On success
/// a reset token is issued exactly as if the mailed link had been requested.
pub async fn validate_answers(
    state: &AppState,
    payload: ValidateAnswersRequest,
) -> AppResult<ApiResponse<ValidationSuccess>> {
    let stored = Questions::find()
        .filter(QuestionCol::UserId.eq(payload.user_id))
        .order_by_asc(QuestionCol::QuestionOrder)
        .all(&state.orm)
        .await?;
    if stored.is_empty() {
        return Err(AppError::BadRequest(
            "El usuario no tiene preguntas de seguridad configuradas".into(),
        ));
    }
    if payload.questions.len() != stored.len() {
        return Err(AppError::BadRequest(format!(
            "Se esperaban {} respuestas, se recibieron {}",
            stored.len(),
            payload.questions.len()
        )));
    }
    let distinct: HashSet<Uuid> = payload.questions.iter().map(|q| q.id).collect();
    if distinct.len() != payload.questions.len() {
        return Err(AppError::BadRequest(
            "Cada pregunta debe responderse una sola vez".into(),
        ));
    }

    let mut failures: Vec<AnswerFailure> = Vec::new();
    for entry in &payload.questions {
        let question = stored.iter().find(|q| q.id == entry.id);
        let question = match question {
            Some(q) => q,
            None => {
                failures.push(AnswerFailure {
                    order: entry.order,
                    message: "Pregunta desconocida".into(),
                });
                continue;
            }
        };

        if question.question_order != entry.order {
            failures.push(AnswerFailure {
                order: entry.order,
                message: "El orden de la pregunta no coincide".into(),
            });
            continue;
        }

        let answer_row = Answers::find()
            .filter(AnswerCol::QuestionId.eq(question.id))
            .one(&state.orm)
            .await?;
        let matches = answer_row
            .map(|row| verify_password(&normalize_answer(&entry.answer), &row.answer_hash))
            .unwrap_or(false);
        if !matches {
            failures.push(AnswerFailure {
                order: entry.order,
                message: "Respuesta incorrecta".into(),
            });
        }
    }

    if !failures.is_empty() {
        tracing::warn!(user_id = %payload.user_id, failed = failures.len(), "security answers rejected");
        return Err(AppError::BadRequest(failure_summary(&failures)));
    }

    let token = generate_token();
    let expiration = Utc::now() + Duration::hours(RESET_TOKEN_HOURS);

    let txn = state.orm.begin().await?;

    ResetTokens::delete_many()
        .filter(ResetTokenCol::UserId.eq(payload.user_id))
        .exec(&txn)
        .await?;

    ResetTokenActive {
        id: Set(Uuid::new_v4()),
        token: Set(token.clone()),
        expiration: Set(expiration.fixed_offset()),
        user_id: Set(payload.user_id),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    tracing::info!(user_id = %payload.user_id, "security answers validated, reset token issued");

    Ok(ApiResponse::success(
        "Respuestas validadas",
        ValidationSuccess {
            validated: true,
            token,
            expiration,
        },
        Some(Meta::empty()),
    ))
}

/// Where the user stands in the recovery flow, derived in one place instead
/// of being inferred from row presence at every call site.
pub async fn recovery_state(
    state: &AppState,
    email: &str,
) -> AppResult<ApiResponse<RecoveryState>> {
    let user = Users::find()
        .filter(UserCol::Email.eq(email))
        .one(&state.orm)
        .await?;
    let user = match user {
        Some(u) => u,
        None => return Err(AppError::NotFound),
    };
    let user_id = user.id;

    let live_token: Option<DateTime<Utc>> = ResetTokens::find()
        .filter(ResetTokenCol::UserId.eq(user_id))
        .one(&state.orm)
        .await?
        .map(|r| r.expiration.with_timezone(&Utc))
        .filter(|exp| *exp > Utc::now());

    if let Some(expiration) = live_token {
        return Ok(ApiResponse::success(
            "Ok",
            RecoveryState::TokenIssued { expiration },
            Some(Meta::empty()),
        ));
    }

    let count = Questions::find()
        .filter(QuestionCol::UserId.eq(user_id))
        .all(&state.orm)
        .await?
        .len();

    let derived = if count == 0 {
        RecoveryState::Idle
    } else {
        RecoveryState::QuestionsSet { count }
    };

    Ok(ApiResponse::success("Ok", derived, Some(Meta::empty())))
}

async fn fetch_question_views(
    state: &AppState,
    user_id: Uuid,
) -> AppResult<Vec<SecurityQuestionView>> {
    let rows = Questions::find()
        .filter(QuestionCol::UserId.eq(user_id))
        .order_by_asc(QuestionCol::QuestionOrder)
        .all(&state.orm)
        .await?;

    Ok(rows
        .into_iter()
        .map(|q| SecurityQuestionView {
            id: q.id,
            question_text: q.question_text,
            question_order: q.question_order,
            is_custom: q.is_custom,
            created_at: q.created_at.with_timezone(&Utc),
        })
        .collect())
}

/// Answers compare case- and whitespace-insensitively.
fn normalize_answer(answer: &str) -> String {
    answer.trim().to_lowercase()
}

fn failure_summary(failures: &[AnswerFailure]) -> String {
    let detail: Vec<String> = failures
        .iter()
        .map(|f| format!("pregunta {}: {}", f.order, f.message))
        .collect();
    format!("Validación fallida ({})", detail.join("; "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answers_normalize_case_and_whitespace() {
        assert_eq!(normalize_answer("  Fluffy  "), "fluffy");
        assert_eq!(normalize_answer("CARACAS"), "caracas");
    }

    #[test]
    fn failure_summary_names_each_order() {
        let failures = vec![
            AnswerFailure {
                order: 1,
                message: "Respuesta incorrecta".into(),
            },
            AnswerFailure {
                order: 3,
                message: "El orden de la pregunta no coincide".into(),
            },
        ];
        let summary = failure_summary(&failures);
        assert!(summary.contains("pregunta 1"));
        assert!(summary.contains("pregunta 3"));
    }
}
