use axum::{
    Json, Router,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{
    dto::users::{ResetUserPasswordRequest, UpdateUserRequest, UserList},
    error::AppResult,
    middleware::auth::Principal,
    models::User,
    response::ApiResponse,
    services::user_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::get(list_users))
        .route("/{id}", axum::routing::get(get_user))
        .route("/{id}", axum::routing::put(update_user))
        .route("/{id}", axum::routing::delete(deactivate_user))
        .route("/reset-password", axum::routing::post(reset_user_password))
}

#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "List customer accounts", body = ApiResponse<UserList>),
        (status = 401, description = "Not signed in"),
        (status = 403, description = "Not an admin"),
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn list_users(
    State(state): State<AppState>,
    principal: Principal,
) -> AppResult<Json<ApiResponse<UserList>>> {
    user_service::list_users(&state, &principal).await.map(Json)
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Get customer account", body = ApiResponse<User>),
        (status = 404, description = "User not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn get_user(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<User>>> {
    user_service::get_user(&state, &principal, id).await.map(Json)
}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = ApiResponse<User>),
        (status = 404, description = "User not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn update_user(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    user_service::update_user(&state, &principal, id, payload)
        .await
        .map(Json)
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User deactivated, orders retained"),
        (status = 404, description = "User not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn deactivate_user(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    user_service::deactivate_user(&state, &principal, id)
        .await
        .map(Json)
}

#[utoipa::path(
    post,
    path = "/api/users/reset-password",
    request_body = ResetUserPasswordRequest,
    responses(
        (status = 200, description = "Reset link emailed to the account address"),
        (status = 404, description = "User not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn reset_user_password(
    State(state): State<AppState>,
    principal: Principal,
    Json(payload): Json<ResetUserPasswordRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    user_service::reset_user_password(&state, &principal, payload)
        .await
        .map(Json)
}
