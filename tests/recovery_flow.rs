use std::sync::Arc;

use destilo_api::{
    db::{create_orm_conn, create_pool, run_migrations},
    dto::{
        auth::{CreateUserRequest, LoginRequest, ResetPasswordRequest},
        security::{AnswerEntry, QuestionEntry, SetupQuestionsRequest, ValidateAnswersRequest},
    },
    mailer::Mailer,
    services::{recovery_service, user_service},
    state::AppState,
};
use sea_orm::{ConnectionTrait, Statement};

// Full recovery flow: register -> activate -> configure questions -> fail a
// validation -> pass validation -> reset with the issued token -> log in with
// the new password -> the token is spent.
#[tokio::test]
async fn security_question_recovery_flow() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    // JWT_SECRET is read at login time.
    // SAFETY: tests in this binary run on the tokio current-thread runtime
    // and nothing else reads the environment concurrently.
    unsafe { std::env::set_var("JWT_SECRET", "test-secret") };

    let created = user_service::create_user(
        &state,
        CreateUserRequest {
            username: "mariana".into(),
            email: "mariana@example.com".into(),
            password: "original-pass".into(),
            role: None,
        },
    )
    .await?;
    let created = created.data.expect("created user");
    assert_eq!(created.user.status, "pending");
    assert_eq!(created.user.role, "employee");

    // Only admin/employee are accepted as roles.
    let bad_role = user_service::create_user(
        &state,
        CreateUserRequest {
            username: "intruso".into(),
            email: "intruso@example.com".into(),
            password: "whatever-pass".into(),
            role: Some("superuser".into()),
        },
    )
    .await;
    assert!(bad_role.is_err());

    // Cannot log in before activation.
    let early_login = user_service::login(
        &state,
        LoginRequest {
            username: "mariana".into(),
            password: "original-pass".into(),
        },
    )
    .await;
    assert!(early_login.is_err());

    // The activation token is single-use.
    let activated = user_service::activate_account(&state, &created.token).await?;
    assert_eq!(activated.data.unwrap().status, "activated");
    assert!(user_service::activate_account(&state, &created.token)
        .await
        .is_err());

    let user_id = created.user.id;

    recovery_service::setup_questions(
        &state,
        SetupQuestionsRequest {
            user_id,
            questions: vec![
                QuestionEntry {
                    question: "¿Nombre de tu primera mascota?".into(),
                    answer: "Fluffy".into(),
                    is_custom: false,
                },
                QuestionEntry {
                    question: "¿Ciudad natal?".into(),
                    answer: "Caracas".into(),
                    is_custom: true,
                },
            ],
        },
    )
    .await?;

    let questions = recovery_service::get_questions(&state, user_id).await?;
    let questions = questions.data.expect("question set").questions;
    assert_eq!(questions.len(), 2);
    assert_eq!(questions[0].question_order, 1);

    // One wrong answer rejects the batch: no token is issued.
    let rejected = recovery_service::validate_answers(
        &state,
        ValidateAnswersRequest {
            user_id,
            questions: vec![
                AnswerEntry {
                    id: questions[0].id,
                    answer: "fluffy".into(),
                    order: 1,
                },
                AnswerEntry {
                    id: questions[1].id,
                    answer: "maracaibo".into(),
                    order: 2,
                },
            ],
        },
    )
    .await;
    assert!(rejected.is_err());

    // Claimed order must match the stored one.
    let misordered = recovery_service::validate_answers(
        &state,
        ValidateAnswersRequest {
            user_id,
            questions: vec![
                AnswerEntry {
                    id: questions[0].id,
                    answer: "fluffy".into(),
                    order: 2,
                },
                AnswerEntry {
                    id: questions[1].id,
                    answer: "caracas".into(),
                    order: 1,
                },
            ],
        },
    )
    .await;
    assert!(misordered.is_err());

    // Repeating one question does not stand in for answering them all.
    let duplicated = recovery_service::validate_answers(
        &state,
        ValidateAnswersRequest {
            user_id,
            questions: vec![
                AnswerEntry {
                    id: questions[0].id,
                    answer: "fluffy".into(),
                    order: 1,
                },
                AnswerEntry {
                    id: questions[0].id,
                    answer: "fluffy".into(),
                    order: 1,
                },
            ],
        },
    )
    .await;
    assert!(duplicated.is_err());

    // Correct answers (case/whitespace-insensitive) issue a reset token.
    let validated = recovery_service::validate_answers(
        &state,
        ValidateAnswersRequest {
            user_id,
            questions: vec![
                AnswerEntry {
                    id: questions[0].id,
                    answer: "  FLUFFY ".into(),
                    order: 1,
                },
                AnswerEntry {
                    id: questions[1].id,
                    answer: "caracas".into(),
                    order: 2,
                },
            ],
        },
    )
    .await?;
    let validated = validated.data.expect("validation result");
    assert!(validated.validated);

    recovery_service::reset_password(
        &state,
        ResetPasswordRequest {
            token: validated.token.clone(),
            new_password: "brand-new-pass".into(),
        },
    )
    .await?;

    // New password works, old one does not.
    let login = user_service::login(
        &state,
        LoginRequest {
            username: "mariana".into(),
            password: "brand-new-pass".into(),
        },
    )
    .await?;
    assert!(!login.data.unwrap().token.is_empty());

    let stale = user_service::login(
        &state,
        LoginRequest {
            username: "mariana".into(),
            password: "original-pass".into(),
        },
    )
    .await;
    assert!(stale.is_err());

    // The reset token was burned by the successful reset.
    let reuse = recovery_service::reset_password(
        &state,
        ResetPasswordRequest {
            token: validated.token,
            new_password: "another-pass".into(),
        },
    )
    .await;
    assert!(reuse.is_err());

    Ok(())
}

async fn setup_state() -> anyhow::Result<Option<AppState>> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(None);
        }
    };

    let pool = create_pool(&database_url).await?;
    let orm = create_orm_conn(&database_url).await?;
    run_migrations(&orm).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE security_answers, security_questions, password_reset_tokens, \
         activation_tokens, users RESTART IDENTITY CASCADE",
    ))
    .await?;

    Ok(Some(AppState {
        pool,
        orm,
        mailer: Arc::new(Mailer::disabled()),
    }))
}
