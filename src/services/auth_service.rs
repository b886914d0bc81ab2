use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    config::AppConfig,
    dto::auth::{Claims, CompleteResetRequest, LoginRequest, LoginResponse, OAuthLoginRequest, RegisterRequest},
    error::{AppError, AppResult},
    models::User,
    response::{ApiResponse, Meta},
    state::AppState,
};

const TOKEN_TTL_HOURS: i64 = 24;

pub(crate) fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| AppError::Internal(anyhow::anyhow!("password hashing failed: {err}")))?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

fn issue_token(config: &AppConfig, id: Uuid, role: &str) -> AppResult<String> {
    let exp = Utc::now() + Duration::hours(TOKEN_TTL_HOURS);
    let claims = Claims {
        sub: id.to_string(),
        role: role.to_string(),
        exp: exp.timestamp() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.session_secret.as_bytes()),
    )
    .map_err(|err| AppError::Internal(anyhow::anyhow!("token signing failed: {err}")))
}

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    name: String,
    password_hash: Option<String>,
    phone: Option<String>,
    image: Option<String>,
    is_active: bool,
    created_at: chrono::DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            name: row.name,
            phone: row.phone,
            image: row.image,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

const USER_COLUMNS: &str =
    "id, email, name, password_hash, phone, image, is_active, created_at";

pub async fn register_customer(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<User>> {
    let email = payload.email.trim().to_lowercase();
    if email.is_empty() || payload.name.trim().is_empty() {
        return Err(AppError::Validation("email and name are required".into()));
    }
    if payload.password.len() < 6 {
        return Err(AppError::Validation(
            "password must be at least 6 characters".into(),
        ));
    }

    let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(&state.pool)
        .await?;
    if exists.is_some() {
        return Err(AppError::Conflict("Email is already taken".into()));
    }

    let hash = hash_password(&payload.password)?;
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "INSERT INTO users (id, email, name, password_hash, phone) \
         VALUES ($1, $2, $3, $4, $5) RETURNING {USER_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(&email)
    .bind(payload.name.trim())
    .bind(&hash)
    .bind(&payload.phone)
    .fetch_one(&state.pool)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(row.id),
        "user_register",
        Some("users"),
        None,
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Account created",
        User::from(row),
        Some(Meta::empty()),
    ))
}

/// Credential login for customer accounts. Unknown emails, wrong passwords
/// and OAuth-only accounts all fail with the same message.
pub async fn login_customer(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let email = payload.email.trim().to_lowercase();
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
    ))
    .bind(&email)
    .fetch_optional(&state.pool)
    .await?;

    let Some(row) = row else {
        return Err(AppError::Validation("Invalid email or password".into()));
    };
    let Some(hash) = row.password_hash.as_deref() else {
        return Err(AppError::Validation("Invalid email or password".into()));
    };
    if !verify_password(&payload.password, hash) {
        return Err(AppError::Validation("Invalid email or password".into()));
    }
    if !row.is_active {
        return Err(AppError::Forbidden);
    }

    let token = issue_token(&state.config, row.id, "customer")?;
    Ok(ApiResponse::success(
        "Logged in",
        LoginResponse { token },
        Some(Meta::empty()),
    ))
}

pub async fn login_admin(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let email = payload.email.trim().to_lowercase();
    let row: Option<(Uuid, String)> =
        sqlx::query_as("SELECT id, password_hash FROM admins WHERE email = $1")
            .bind(&email)
            .fetch_optional(&state.pool)
            .await?;

    let Some((id, hash)) = row else {
        return Err(AppError::Validation("Invalid email or password".into()));
    };
    if !verify_password(&payload.password, &hash) {
        return Err(AppError::Validation("Invalid email or password".into()));
    }

    let token = issue_token(&state.config, id, "admin")?;
    Ok(ApiResponse::success(
        "Logged in",
        LoginResponse { token },
        Some(Meta::empty()),
    ))
}

/// Find-or-create for an email the OAuth provider has already verified.
/// First sign-in creates a passwordless account.
pub async fn oauth_login(
    state: &AppState,
    payload: OAuthLoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    if state.config.google_oauth.is_none() {
        return Err(AppError::Validation("OAuth sign-in is not configured".into()));
    }
    let email = payload.email.trim().to_lowercase();
    if email.is_empty() {
        return Err(AppError::Validation("email is required".into()));
    }

    let row = sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
    ))
    .bind(&email)
    .fetch_optional(&state.pool)
    .await?;

    let user = match row {
        Some(row) => {
            if !row.is_active {
                return Err(AppError::Forbidden);
            }
            row
        }
        None => {
            sqlx::query_as::<_, UserRow>(&format!(
                "INSERT INTO users (id, email, name, image) \
                 VALUES ($1, $2, $3, $4) RETURNING {USER_COLUMNS}"
            ))
            .bind(Uuid::new_v4())
            .bind(&email)
            .bind(payload.name.trim())
            .bind(&payload.image)
            .fetch_one(&state.pool)
            .await?
        }
    };

    let token = issue_token(&state.config, user.id, "customer")?;
    Ok(ApiResponse::success(
        "Logged in",
        LoginResponse { token },
        Some(Meta::empty()),
    ))
}

/// Final step of the customer reset flow started by an admin: the emailed
/// token is exchanged for a new password and then invalidated.
pub async fn complete_reset(
    state: &AppState,
    payload: CompleteResetRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    if payload.new_password.len() < 6 {
        return Err(AppError::Validation(
            "password must be at least 6 characters".into(),
        ));
    }

    let row: Option<(Uuid, Option<chrono::DateTime<Utc>>)> = sqlx::query_as(
        "SELECT id, reset_token_expiry FROM users WHERE reset_token = $1",
    )
    .bind(&payload.token)
    .fetch_optional(&state.pool)
    .await?;

    let Some((user_id, expiry)) = row else {
        return Err(AppError::Validation("Reset token is invalid or expired".into()));
    };
    if !expiry.is_some_and(|e| e > Utc::now()) {
        return Err(AppError::Validation("Reset token is invalid or expired".into()));
    }

    let hash = hash_password(&payload.new_password)?;
    sqlx::query(
        "UPDATE users SET password_hash = $1, reset_token = NULL, reset_token_expiry = NULL \
         WHERE id = $2",
    )
    .bind(&hash)
    .bind(user_id)
    .execute(&state.pool)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user_id),
        "user_password_reset_complete",
        Some("users"),
        None,
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Password updated",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trip() {
        let hash = hash_password("hunter2!").unwrap();
        assert!(verify_password("hunter2!", &hash));
        assert!(!verify_password("hunter3!", &hash));
    }

    #[test]
    fn verify_rejects_garbage_hashes() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }
}
