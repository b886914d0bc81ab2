use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    models::{Order, OrderItem},
    order_status::{OrderStatus, TimelineStep},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct PlaceOrderRequest {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub shipping_address: Option<String>,
    pub items: Vec<OrderItemInput>,
    pub total: Decimal,
}

/// One checkout line; `price` is the price at add-to-cart time and becomes
/// the immutable snapshot on the order item.
#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderItemInput {
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PlaceOrderResponse {
    pub order_id: Uuid,
    pub reference: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderTimeline {
    pub status: OrderStatus,
    pub cancelled: bool,
    pub steps: Vec<TimelineStep>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}

/// "My orders" view: line items carry the product name and image so the
/// account page can render without extra catalog fetches.
#[derive(Debug, Serialize, ToSchema)]
pub struct CustomerOrder {
    pub id: Uuid,
    pub total: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub items: Vec<CustomerOrderItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CustomerOrderItem {
    pub product_id: Uuid,
    pub product_name: String,
    pub product_image: String,
    pub quantity: i32,
    pub price: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CustomerOrderList {
    pub orders: Vec<CustomerOrder>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CustomerOrdersQuery {
    pub limit: Option<i64>,
}
