use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    dto::testimonials::{CreateTestimonialRequest, TestimonialList, UpdateTestimonialRequest},
    entity::testimonials::{
        ActiveModel as TestimonialActive, Column as TestimonialCol, Entity as Testimonials,
        Model as TestimonialModel,
    },
    error::{AppError, AppResult},
    middleware::auth::Principal,
    models::Testimonial,
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Public callers only see active testimonials; admins see everything.
pub async fn list_testimonials(
    state: &AppState,
    principal: &Principal,
) -> AppResult<ApiResponse<TestimonialList>> {
    let mut finder = Testimonials::find().order_by_desc(TestimonialCol::CreatedAt);
    if !matches!(principal, Principal::Admin(_)) {
        finder = finder.filter(TestimonialCol::IsActive.eq(true));
    }

    let items = finder
        .all(&state.orm)
        .await?
        .into_iter()
        .map(testimonial_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Testimonials",
        TestimonialList { items },
        Some(Meta::empty()),
    ))
}

pub async fn create_testimonial(
    state: &AppState,
    principal: &Principal,
    payload: CreateTestimonialRequest,
) -> AppResult<ApiResponse<Testimonial>> {
    principal.require_admin()?;

    if payload.name.trim().is_empty() || payload.text.trim().is_empty() {
        return Err(AppError::Validation("name and text are required".into()));
    }
    let rating = payload.rating.unwrap_or(5);
    validate_rating(rating)?;

    let testimonial = TestimonialActive {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name.trim().to_string()),
        text: Set(payload.text.trim().to_string()),
        rating: Set(rating),
        is_active: Set(payload.is_active.unwrap_or(true)),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success(
        "Testimonial created",
        testimonial_from_entity(testimonial),
        Some(Meta::empty()),
    ))
}

pub async fn update_testimonial(
    state: &AppState,
    principal: &Principal,
    id: Uuid,
    payload: UpdateTestimonialRequest,
) -> AppResult<ApiResponse<Testimonial>> {
    principal.require_admin()?;

    let existing = Testimonials::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: TestimonialActive = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(text) = payload.text {
        active.text = Set(text);
    }
    if let Some(rating) = payload.rating {
        validate_rating(rating)?;
        active.rating = Set(rating);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }

    let testimonial = active.update(&state.orm).await?;
    Ok(ApiResponse::success(
        "Testimonial updated",
        testimonial_from_entity(testimonial),
        Some(Meta::empty()),
    ))
}

pub async fn delete_testimonial(
    state: &AppState,
    principal: &Principal,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    principal.require_admin()?;

    let result = Testimonials::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    Ok(ApiResponse::success(
        "Testimonial deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

fn validate_rating(rating: i32) -> AppResult<()> {
    if !(1..=5).contains(&rating) {
        return Err(AppError::Validation("rating must be between 1 and 5".into()));
    }
    Ok(())
}

fn testimonial_from_entity(model: TestimonialModel) -> Testimonial {
    Testimonial {
        id: model.id,
        name: model.name,
        text: model.text,
        rating: model.rating,
        is_active: model.is_active,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
