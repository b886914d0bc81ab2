use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    dto::admins::{
        AdminList, CreateAdminRequest, DashboardStats, ResetAdminPasswordRequest,
        UpdateAdminRequest,
    },
    error::AppResult,
    middleware::auth::Principal,
    models::Admin,
    response::ApiResponse,
    services::admin_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::get(list_admins))
        .route("/", axum::routing::post(create_admin))
        .route("/{id}", axum::routing::get(get_admin))
        .route("/{id}", axum::routing::put(update_admin))
        .route("/{id}", axum::routing::delete(delete_admin))
        .route("/reset-password", axum::routing::post(reset_admin_password))
        .route("/dashboard", axum::routing::get(dashboard))
}

#[utoipa::path(
    get,
    path = "/api/admin",
    responses(
        (status = 200, description = "List admin accounts", body = ApiResponse<AdminList>),
        (status = 401, description = "Not signed in"),
        (status = 403, description = "Not an admin"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_admins(
    State(state): State<AppState>,
    principal: Principal,
) -> AppResult<Json<ApiResponse<AdminList>>> {
    admin_service::list_admins(&state, &principal).await.map(Json)
}

#[utoipa::path(
    get,
    path = "/api/admin/{id}",
    params(("id" = Uuid, Path, description = "Admin id")),
    responses(
        (status = 200, description = "Admin detail", body = ApiResponse<Admin>),
        (status = 404, description = "Admin not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn get_admin(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Admin>>> {
    admin_service::get_admin(&state, &principal, id).await.map(Json)
}

#[utoipa::path(
    post,
    path = "/api/admin",
    request_body = CreateAdminRequest,
    responses(
        (status = 201, description = "Admin created", body = ApiResponse<Admin>),
        (status = 409, description = "Email already taken"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_admin(
    State(state): State<AppState>,
    principal: Principal,
    Json(payload): Json<CreateAdminRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Admin>>)> {
    let response = admin_service::create_admin(&state, &principal, payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    put,
    path = "/api/admin/{id}",
    params(
        ("id" = Uuid, Path, description = "Admin ID")
    ),
    request_body = UpdateAdminRequest,
    responses(
        (status = 200, description = "Admin updated", body = ApiResponse<Admin>),
        (status = 404, description = "Admin not found"),
        (status = 409, description = "Email already taken"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_admin(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAdminRequest>,
) -> AppResult<Json<ApiResponse<Admin>>> {
    admin_service::update_admin(&state, &principal, id, payload)
        .await
        .map(Json)
}

#[utoipa::path(
    delete,
    path = "/api/admin/{id}",
    params(
        ("id" = Uuid, Path, description = "Admin ID")
    ),
    responses(
        (status = 200, description = "Admin deleted"),
        (status = 404, description = "Admin not found"),
        (status = 409, description = "Cannot delete your own account"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_admin(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    admin_service::delete_admin(&state, &principal, id)
        .await
        .map(Json)
}

#[utoipa::path(
    post,
    path = "/api/admin/reset-password",
    request_body = ResetAdminPasswordRequest,
    responses(
        (status = 200, description = "Temporary password emailed"),
        (status = 404, description = "Admin not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn reset_admin_password(
    State(state): State<AppState>,
    principal: Principal,
    Json(payload): Json<ResetAdminPasswordRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    admin_service::reset_admin_password(&state, &principal, payload)
        .await
        .map(Json)
}

#[utoipa::path(
    get,
    path = "/api/admin/dashboard",
    responses(
        (status = 200, description = "Store-wide counters and revenue", body = ApiResponse<DashboardStats>),
        (status = 401, description = "Not signed in"),
        (status = 403, description = "Not an admin"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn dashboard(
    State(state): State<AppState>,
    principal: Principal,
) -> AppResult<Json<ApiResponse<DashboardStats>>> {
    admin_service::dashboard_stats(&state, &principal)
        .await
        .map(Json)
}
