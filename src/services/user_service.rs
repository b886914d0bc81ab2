use chrono::{Duration, Utc};
use rand::RngCore;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::users::{ResetUserPasswordRequest, UpdateUserRequest, UserList},
    entity::users::{ActiveModel as UserActive, Column as UserCol, Entity as Users, Model as UserModel},
    error::{AppError, AppResult},
    middleware::auth::Principal,
    models::User,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_users(
    state: &AppState,
    principal: &Principal,
) -> AppResult<ApiResponse<UserList>> {
    principal.require_admin()?;

    let items = Users::find()
        .order_by_desc(UserCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(user_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Users",
        UserList { items },
        Some(Meta::empty()),
    ))
}

pub async fn get_user(
    state: &AppState,
    principal: &Principal,
    id: Uuid,
) -> AppResult<ApiResponse<User>> {
    principal.require_admin()?;

    let user = Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success(
        "OK",
        user_from_entity(user),
        Some(Meta::empty()),
    ))
}

pub async fn update_user(
    state: &AppState,
    principal: &Principal,
    id: Uuid,
    payload: UpdateUserRequest,
) -> AppResult<ApiResponse<User>> {
    principal.require_admin()?;

    let existing = Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: UserActive = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(phone) = payload.phone {
        active.phone = Set(Some(phone));
    }
    if let Some(image) = payload.image {
        active.image = Set(Some(image));
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }

    let user = active.update(&state.orm).await?;
    Ok(ApiResponse::success(
        "User updated",
        user_from_entity(user),
        Some(Meta::empty()),
    ))
}

/// Soft delete. The account keeps its orders but can no longer sign in.
pub async fn deactivate_user(
    state: &AppState,
    principal: &Principal,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let actor_id = principal.require_admin()?;

    let existing = Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: UserActive = existing.into();
    active.is_active = Set(false);
    active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(actor_id),
        "user_deactivate",
        Some("users"),
        Some(serde_json::json!({ "user_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "User deactivated",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Start the customer reset flow: store a one-hour token and email the
/// reset link to the account address.
pub async fn reset_user_password(
    state: &AppState,
    principal: &Principal,
    payload: ResetUserPasswordRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let actor_id = principal.require_admin()?;

    let user = Users::find_by_id(payload.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mailer = state.notifier.mailer().ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!("email delivery is not configured"))
    })?;

    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    let token = hex::encode(bytes);
    let expiry = Utc::now() + Duration::hours(1);

    let mut active: UserActive = user.clone().into();
    active.reset_token = Set(Some(token.clone()));
    active.reset_token_expiry = Set(Some(expiry.into()));
    active.update(&state.orm).await?;

    let reset_link = format!("{}/reset-password?token={}", state.config.site_url, token);
    mailer
        .send_password_reset(&user.email, &user.name, &reset_link)
        .await
        .map_err(|err| AppError::Internal(anyhow::anyhow!("reset email failed: {err}")))?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(actor_id),
        "user_password_reset_start",
        Some("users"),
        Some(serde_json::json!({ "user_id": user.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Reset link sent",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

fn user_from_entity(model: UserModel) -> User {
    User {
        id: model.id,
        email: model.email,
        name: model.name,
        phone: model.phone,
        image: model.image,
        is_active: model.is_active,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
