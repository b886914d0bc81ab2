use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    dto::testimonials::{CreateTestimonialRequest, TestimonialList, UpdateTestimonialRequest},
    error::AppResult,
    middleware::auth::Principal,
    models::Testimonial,
    response::ApiResponse,
    services::testimonial_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::get(list_testimonials))
        .route("/", axum::routing::post(create_testimonial))
        .route("/{id}", axum::routing::put(update_testimonial))
        .route("/{id}", axum::routing::delete(delete_testimonial))
}

#[utoipa::path(
    get,
    path = "/api/testimonials",
    responses(
        (status = 200, description = "Active testimonials; admins also see hidden ones", body = ApiResponse<TestimonialList>)
    ),
    tag = "Testimonials"
)]
pub async fn list_testimonials(
    State(state): State<AppState>,
    principal: Principal,
) -> AppResult<Json<ApiResponse<TestimonialList>>> {
    testimonial_service::list_testimonials(&state, &principal)
        .await
        .map(Json)
}

#[utoipa::path(
    post,
    path = "/api/testimonials",
    request_body = CreateTestimonialRequest,
    responses(
        (status = 201, description = "Testimonial created", body = ApiResponse<Testimonial>),
        (status = 400, description = "Rating out of range"),
    ),
    security(("bearer_auth" = [])),
    tag = "Testimonials"
)]
pub async fn create_testimonial(
    State(state): State<AppState>,
    principal: Principal,
    Json(payload): Json<CreateTestimonialRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Testimonial>>)> {
    let response = testimonial_service::create_testimonial(&state, &principal, payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    put,
    path = "/api/testimonials/{id}",
    params(
        ("id" = Uuid, Path, description = "Testimonial ID")
    ),
    request_body = UpdateTestimonialRequest,
    responses(
        (status = 200, description = "Testimonial updated", body = ApiResponse<Testimonial>),
        (status = 404, description = "Testimonial not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Testimonials"
)]
pub async fn update_testimonial(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTestimonialRequest>,
) -> AppResult<Json<ApiResponse<Testimonial>>> {
    testimonial_service::update_testimonial(&state, &principal, id, payload)
        .await
        .map(Json)
}

#[utoipa::path(
    delete,
    path = "/api/testimonials/{id}",
    params(
        ("id" = Uuid, Path, description = "Testimonial ID")
    ),
    responses(
        (status = 200, description = "Testimonial deleted"),
        (status = 404, description = "Testimonial not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Testimonials"
)]
pub async fn delete_testimonial(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    testimonial_service::delete_testimonial(&state, &principal, id)
        .await
        .map(Json)
}
