use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Absolute-quantity write-through: the client sends the final quantity for
/// the line, mirroring its local cart state. Quantity <= 0 removes the line.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpsertCartItemRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MergeCartRequest {
    pub items: Vec<MergeCartLine>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MergeCartLine {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RemoveCartQuery {
    pub product_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartLineProduct {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub image: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartLine {
    pub id: Uuid,
    pub product: CartLineProduct,
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartSummary {
    pub items: Vec<CartLine>,
    /// Σ price × quantity over all lines.
    pub total: Decimal,
    /// Σ quantity over all lines.
    pub count: i64,
}
