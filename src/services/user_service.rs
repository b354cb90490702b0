//! Accounts: login, user administration and the activation handshake.
//!
//! New accounts start in `pending` and cannot log in until the activation
//! token mailed at creation time is redeemed. The user row, the token row and
//! the outgoing email sit in one transaction, so a mail failure leaves no
//! half-created account behind.

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use rand::Rng;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    dto::auth::{
        ActivationResult, Claims, CreateUserRequest, CreatedUserResponse, LoginRequest,
        LoginResponse, UpdateUserRequest,
    },
    entity::{
        activation_tokens::{
            ActiveModel as ActivationTokenActive, Column as ActivationTokenCol,
            Entity as ActivationTokens,
        },
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    models::UserPublic,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_VALIDATED: &str = "validated";

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_EMPLOYEE: &str = "employee";

const ACTIVATION_TOKEN_HOURS: i64 = 24;

fn check_role(role: &str) -> AppResult<()> {
    if role != ROLE_ADMIN && role != ROLE_EMPLOYEE {
        return Err(AppError::BadRequest(format!(
            "Rol inválido: {role}. Debe ser admin o employee"
        )));
    }
    Ok(())
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("password hashing failed: {e}")))?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// 32 random bytes, hex-encoded. Used for activation and reset tokens.
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    hex::encode(bytes)
}

pub fn issue_jwt(user: &crate::entity::users::Model) -> AppResult<String> {
    let secret = std::env::var("JWT_SECRET")
        .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))?;

    let claims = Claims {
        sub: user.id.to_string(),
        username: user.username.clone(),
        role: user.role.clone(),
        exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("token signing failed: {e}")))
}

pub async fn login(state: &AppState, payload: LoginRequest) -> AppResult<ApiResponse<LoginResponse>> {
    let user = Users::find()
        .filter(UserCol::Username.eq(payload.username.as_str()))
        .one(&state.orm)
        .await?;

    let user = match user {
        Some(u) => u,
        None => return Err(AppError::Unauthorized("Credenciales inválidas".into())),
    };

    if !verify_password(&payload.password, &user.password_hash) {
        return Err(AppError::Unauthorized("Credenciales inválidas".into()));
    }

    if user.status != STATUS_VALIDATED {
        return Err(AppError::Unauthorized(
            "La cuenta no ha sido activada. Revisa tu correo".into(),
        ));
    }

    let token = issue_jwt(&user)?;
    tracing::info!(user_id = %user.id, username = %user.username, "login");

    Ok(ApiResponse::success(
        "Sesión iniciada",
        LoginResponse {
            user: user_public_from_entity(user),
            token,
        },
        Some(Meta::empty()),
    ))
}

pub async fn create_user(
    state: &AppState,
    payload: CreateUserRequest,
) -> AppResult<ApiResponse<CreatedUserResponse>> {
    if payload.username.trim().is_empty() || payload.password.len() < 6 {
        return Err(AppError::BadRequest(
            "Se requieren username, email y una contraseña de al menos 6 caracteres".into(),
        ));
    }
    let role = payload.role.unwrap_or_else(|| ROLE_EMPLOYEE.to_string());
    check_role(&role)?;

    let taken = Users::find()
        .filter(
            sea_orm::Condition::any()
                .add(UserCol::Username.eq(payload.username.as_str()))
                .add(UserCol::Email.eq(payload.email.as_str())),
        )
        .one(&state.orm)
        .await?;
    if taken.is_some() {
        return Err(AppError::BadRequest(
            "El nombre de usuario o el correo ya están registrados".into(),
        ));
    }

    let password_hash = hash_password(&payload.password)?;
    let token = generate_token();

    let txn = state.orm.begin().await?;

    let user = UserActive {
        id: Set(Uuid::new_v4()),
        username: Set(payload.username.clone()),
        email: Set(payload.email.clone()),
        password_hash: Set(password_hash),
        role: Set(role),
        status: Set(STATUS_PENDING.to_string()),
        created_at: Set(Utc::now().fixed_offset()),
    }
    .insert(&txn)
    .await?;

    ActivationTokens::delete_many()
        .filter(ActivationTokenCol::UserId.eq(user.id))
        .exec(&txn)
        .await?;

    ActivationTokenActive {
        id: Set(Uuid::new_v4()),
        token: Set(token.clone()),
        expiration: Set((Utc::now() + Duration::hours(ACTIVATION_TOKEN_HOURS)).fixed_offset()),
        user_id: Set(user.id),
    }
    .insert(&txn)
    .await?;

    // Send before commit: if the mail bounces at the transport the account
    // is rolled back and the caller can retry with the same payload.
    state
        .mailer
        .send_activation_email(&user.username, &user.email, &token)
        .await
        .map_err(AppError::Internal)?;

    txn.commit().await?;

    tracing::info!(user_id = %user.id, username = %user.username, "user created, activation pending");

    Ok(ApiResponse::success(
        "Usuario creado. Revisa tu correo para activar la cuenta",
        CreatedUserResponse {
            user: user_public_from_entity(user),
            token,
        },
        Some(Meta::empty()),
    ))
}

pub async fn list_users(state: &AppState) -> AppResult<ApiResponse<Vec<UserPublic>>> {
    let users = Users::find()
        .order_by_asc(UserCol::Username)
        .all(&state.orm)
        .await?;

    let total = users.len() as i64;
    let users = users.into_iter().map(user_public_from_entity).collect();

    Ok(ApiResponse::success(
        "Ok",
        users,
        Some(Meta::new(1, total.max(1), total)),
    ))
}

pub async fn get_user(state: &AppState, id: Uuid) -> AppResult<ApiResponse<UserPublic>> {
    let user = Users::find_by_id(id).one(&state.orm).await?;
    match user {
        Some(u) => Ok(ApiResponse::success(
            "Ok",
            user_public_from_entity(u),
            Some(Meta::empty()),
        )),
        None => Err(AppError::NotFound),
    }
}

pub async fn update_user(
    state: &AppState,
    id: Uuid,
    payload: UpdateUserRequest,
) -> AppResult<ApiResponse<UserPublic>> {
    let user = Users::find_by_id(id).one(&state.orm).await?;
    let user = match user {
        Some(u) => u,
        None => return Err(AppError::NotFound),
    };

    let mut active: UserActive = user.into();
    if let Some(username) = payload.username {
        let taken = Users::find()
            .filter(UserCol::Username.eq(username.as_str()))
            .filter(UserCol::Id.ne(id))
            .one(&state.orm)
            .await?;
        if taken.is_some() {
            return Err(AppError::BadRequest(
                "El nombre de usuario ya está registrado".into(),
            ));
        }
        active.username = Set(username);
    }
    if let Some(password) = payload.password {
        if password.len() < 6 {
            return Err(AppError::BadRequest(
                "La contraseña debe tener al menos 6 caracteres".into(),
            ));
        }
        active.password_hash = Set(hash_password(&password)?);
    }
    if let Some(role) = payload.role {
        check_role(&role)?;
        active.role = Set(role);
    }

    let user = active.update(&state.orm).await?;
    Ok(ApiResponse::success(
        "Usuario actualizado",
        user_public_from_entity(user),
        Some(Meta::empty()),
    ))
}

pub async fn delete_user(state: &AppState, id: Uuid) -> AppResult<ApiResponse<UserPublic>> {
    let user = Users::find_by_id(id).one(&state.orm).await?;
    let user = match user {
        Some(u) => u,
        None => return Err(AppError::NotFound),
    };

    Users::delete_by_id(id).exec(&state.orm).await?;
    tracing::info!(user_id = %id, "user deleted");

    Ok(ApiResponse::success(
        "Usuario eliminado",
        user_public_from_entity(user),
        Some(Meta::empty()),
    ))
}

/// Redeem an activation token: flips the user to `validated` and burns the
/// token in the same transaction. Unknown tokens are 404; expired tokens and
/// already-validated accounts are 400.
pub async fn activate_account(
    state: &AppState,
    token: &str,
) -> AppResult<ApiResponse<ActivationResult>> {
    let txn = state.orm.begin().await?;

    let row = ActivationTokens::find()
        .filter(ActivationTokenCol::Token.eq(token))
        .one(&txn)
        .await?;
    let row = match row {
        Some(r) => r,
        None => return Err(AppError::NotFound),
    };

    if row.expiration.with_timezone(&Utc) < Utc::now() {
        ActivationTokens::delete_by_id(row.id).exec(&txn).await?;
        txn.commit().await?;
        return Err(AppError::BadRequest("El token ha expirado".into()));
    }

    let user = Users::find_by_id(row.user_id).one(&txn).await?;
    let user = match user {
        Some(u) => u,
        None => return Err(AppError::NotFound),
    };

    if user.status == STATUS_VALIDATED {
        ActivationTokens::delete_by_id(row.id).exec(&txn).await?;
        txn.commit().await?;
        return Err(AppError::BadRequest("La cuenta ya fue activada".into()));
    }

    let user_id = user.id;
    let mut active: UserActive = user.into();
    active.status = Set(STATUS_VALIDATED.to_string());
    active.update(&txn).await?;

    ActivationTokens::delete_by_id(row.id).exec(&txn).await?;

    txn.commit().await?;

    tracing::info!(user_id = %user_id, "account activated");

    Ok(ApiResponse::success(
        "Cuenta activada",
        ActivationResult {
            status: "activated".to_string(),
            user_id,
        },
        Some(Meta::empty()),
    ))
}

pub fn user_public_from_entity(model: crate::entity::users::Model) -> UserPublic {
    UserPublic {
        id: model.id,
        username: model.username,
        email: model.email,
        role: model.role,
        status: model.status,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_roundtrip() {
        let hash = hash_password("s3creta").unwrap();
        assert!(verify_password("s3creta", &hash));
        assert!(!verify_password("otra", &hash));
    }

    #[test]
    fn verify_rejects_garbage_hash() {
        assert!(!verify_password("s3creta", "not-a-phc-string"));
    }

    #[test]
    fn generated_tokens_are_64_hex_chars_and_unique() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}
