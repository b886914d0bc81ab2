use axum::{Json, Router, extract::State, http::StatusCode};

use crate::{
    dto::auth::{
        CompleteResetRequest, LoginRequest, LoginResponse, OAuthLoginRequest, RegisterRequest,
    },
    error::AppResult,
    models::User,
    response::ApiResponse,
    services::auth_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", axum::routing::post(register))
        .route("/login", axum::routing::post(login))
        .route("/admin/login", axum::routing::post(admin_login))
        .route("/oauth", axum::routing::post(oauth_login))
        .route("/reset-password", axum::routing::post(complete_reset))
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = ApiResponse<User>),
        (status = 409, description = "Email already taken"),
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<User>>)> {
    let response = auth_service::register_customer(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Bearer token issued", body = ApiResponse<LoginResponse>),
        (status = 400, description = "Invalid credentials"),
        (status = 403, description = "Account deactivated"),
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    auth_service::login_customer(&state, payload).await.map(Json)
}

#[utoipa::path(
    post,
    path = "/api/auth/admin/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Admin bearer token issued", body = ApiResponse<LoginResponse>),
        (status = 400, description = "Invalid credentials"),
    ),
    tag = "Auth"
)]
pub async fn admin_login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    auth_service::login_admin(&state, payload).await.map(Json)
}

#[utoipa::path(
    post,
    path = "/api/auth/oauth",
    request_body = OAuthLoginRequest,
    responses(
        (status = 200, description = "Bearer token for a provider-verified identity", body = ApiResponse<LoginResponse>),
        (status = 400, description = "OAuth sign-in not configured"),
        (status = 403, description = "Account deactivated"),
    ),
    tag = "Auth"
)]
pub async fn oauth_login(
    State(state): State<AppState>,
    Json(payload): Json<OAuthLoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    auth_service::oauth_login(&state, payload).await.map(Json)
}

#[utoipa::path(
    post,
    path = "/api/auth/reset-password",
    request_body = CompleteResetRequest,
    responses(
        (status = 200, description = "Password updated"),
        (status = 400, description = "Token invalid or expired"),
    ),
    tag = "Auth"
)]
pub async fn complete_reset(
    State(state): State<AppState>,
    Json(payload): Json<CompleteResetRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    auth_service::complete_reset(&state, payload).await.map(Json)
}
