use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Admin;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAdminRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateAdminRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    /// Only updates the hash when present and non-empty.
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ResetAdminPasswordRequest {
    pub admin_id: Uuid,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct AdminList {
    #[schema(value_type = Vec<Admin>)]
    pub items: Vec<Admin>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardStats {
    pub orders: i64,
    pub pending_orders: i64,
    pub revenue: Decimal,
    pub products: i64,
    pub customers: i64,
}
