use chrono::Utc;
use rand::RngCore;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::admins::{
        AdminList, CreateAdminRequest, DashboardStats, ResetAdminPasswordRequest,
        UpdateAdminRequest,
    },
    entity::{
        admins::{ActiveModel as AdminActive, Column as AdminCol, Entity as Admins, Model as AdminModel},
        orders::{Column as OrderCol, Entity as Orders},
        products::Entity as Products,
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    middleware::auth::Principal,
    models::Admin,
    order_status::OrderStatus,
    response::{ApiResponse, Meta},
    services::auth_service,
    state::AppState,
};

pub async fn list_admins(
    state: &AppState,
    principal: &Principal,
) -> AppResult<ApiResponse<AdminList>> {
    principal.require_admin()?;

    let items = Admins::find()
        .order_by_asc(AdminCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(admin_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Admins",
        AdminList { items },
        Some(Meta::empty()),
    ))
}

pub async fn get_admin(
    state: &AppState,
    principal: &Principal,
    id: Uuid,
) -> AppResult<ApiResponse<Admin>> {
    principal.require_admin()?;

    let model = Admins::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(ApiResponse::success("Admin", admin_from_entity(model), None))
}

pub async fn create_admin(
    state: &AppState,
    principal: &Principal,
    payload: CreateAdminRequest,
) -> AppResult<ApiResponse<Admin>> {
    let actor_id = principal.require_admin()?;

    let email = payload.email.trim().to_lowercase();
    if email.is_empty() || payload.name.trim().is_empty() || payload.password.is_empty() {
        return Err(AppError::Validation(
            "email, name and password are required".into(),
        ));
    }

    let exists = Admins::find()
        .filter(AdminCol::Email.eq(email.clone()))
        .one(&state.orm)
        .await?;
    if exists.is_some() {
        return Err(AppError::Conflict("Email is already taken".into()));
    }

    let admin = AdminActive {
        id: Set(Uuid::new_v4()),
        email: Set(email),
        name: Set(payload.name.trim().to_string()),
        password_hash: Set(auth_service::hash_password(&payload.password)?),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(actor_id),
        "admin_create",
        Some("admins"),
        Some(serde_json::json!({ "admin_id": admin.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Admin created",
        admin_from_entity(admin),
        Some(Meta::empty()),
    ))
}

pub async fn update_admin(
    state: &AppState,
    principal: &Principal,
    id: Uuid,
    payload: UpdateAdminRequest,
) -> AppResult<ApiResponse<Admin>> {
    principal.require_admin()?;

    let existing = Admins::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: AdminActive = existing.into();
    if let Some(email) = payload.email {
        let email = email.trim().to_lowercase();
        if email.is_empty() {
            return Err(AppError::Validation("email must not be empty".into()));
        }
        let taken = Admins::find()
            .filter(AdminCol::Email.eq(email.clone()))
            .filter(AdminCol::Id.ne(id))
            .one(&state.orm)
            .await?;
        if taken.is_some() {
            return Err(AppError::Conflict("Email is already taken".into()));
        }
        active.email = Set(email);
    }
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    // An empty password field from the edit form means "leave unchanged".
    if let Some(password) = payload.password.filter(|p| !p.is_empty()) {
        active.password_hash = Set(auth_service::hash_password(&password)?);
    }

    let admin = active.update(&state.orm).await?;
    Ok(ApiResponse::success(
        "Admin updated",
        admin_from_entity(admin),
        Some(Meta::empty()),
    ))
}

pub async fn delete_admin(
    state: &AppState,
    principal: &Principal,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let actor_id = principal.require_admin()?;

    if id == actor_id {
        return Err(AppError::Conflict(
            "You cannot delete your own admin account".into(),
        ));
    }

    let result = Admins::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(actor_id),
        "admin_delete",
        Some("admins"),
        Some(serde_json::json!({ "admin_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Admin deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Issue a temporary password and mail it to the admin's address.
pub async fn reset_admin_password(
    state: &AppState,
    principal: &Principal,
    payload: ResetAdminPasswordRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let actor_id = principal.require_admin()?;

    let admin = Admins::find_by_id(payload.admin_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mailer = state.notifier.mailer().ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!("email delivery is not configured"))
    })?;

    let mut bytes = [0u8; 8];
    rand::thread_rng().fill_bytes(&mut bytes);
    let temp_password = hex::encode(bytes);

    let mut active: AdminActive = admin.clone().into();
    active.password_hash = Set(auth_service::hash_password(&temp_password)?);
    active.update(&state.orm).await?;

    let login_link = format!("{}/admin/login", state.config.site_url);
    mailer
        .send_admin_temp_password(&admin.email, &admin.name, &temp_password, &login_link)
        .await
        .map_err(|err| AppError::Internal(anyhow::anyhow!("reset email failed: {err}")))?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(actor_id),
        "admin_password_reset",
        Some("admins"),
        Some(serde_json::json!({ "admin_id": admin.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Temporary password sent",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn dashboard_stats(
    state: &AppState,
    principal: &Principal,
) -> AppResult<ApiResponse<DashboardStats>> {
    principal.require_admin()?;

    let orders = Orders::find().count(&state.orm).await? as i64;
    let pending_orders = Orders::find()
        .filter(OrderCol::Status.eq(OrderStatus::Pending.as_str()))
        .count(&state.orm)
        .await? as i64;
    let products = Products::find().count(&state.orm).await? as i64;
    let customers = Users::find().count(&state.orm).await? as i64;

    let (revenue,): (Decimal,) =
        sqlx::query_as("SELECT COALESCE(SUM(total), 0) FROM orders WHERE status <> 'cancelled'")
            .fetch_one(&state.pool)
            .await?;

    Ok(ApiResponse::success(
        "Dashboard",
        DashboardStats {
            orders,
            pending_orders,
            revenue,
            products,
            customers,
        },
        Some(Meta::empty()),
    ))
}

fn admin_from_entity(model: AdminModel) -> Admin {
    Admin {
        id: model.id,
        email: model.email,
        name: model.name,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
