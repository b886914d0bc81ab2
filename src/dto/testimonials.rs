use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Testimonial;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTestimonialRequest {
    pub name: String,
    pub text: String,
    pub rating: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTestimonialRequest {
    pub name: Option<String>,
    pub text: Option<String>,
    pub rating: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct TestimonialList {
    #[schema(value_type = Vec<Testimonial>)]
    pub items: Vec<Testimonial>,
}
