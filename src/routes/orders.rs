use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    dto::orders::{
        CustomerOrderList, CustomerOrdersQuery, OrderList, OrderTimeline, OrderWithItems,
        PlaceOrderRequest, PlaceOrderResponse, UpdateOrderStatusRequest,
    },
    error::AppResult,
    middleware::auth::Principal,
    models::Order,
    response::ApiResponse,
    routes::params::OrderListQuery,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::post(place_order))
        .route("/", axum::routing::get(list_orders))
        .route("/{id}", axum::routing::get(get_order))
        .route("/{id}", axum::routing::delete(delete_order))
        .route("/{id}/status", axum::routing::put(update_order_status))
        .route("/{id}/timeline", axum::routing::get(get_order_timeline))
}

pub fn customer_router() -> Router<AppState> {
    Router::new().route("/orders", axum::routing::get(list_customer_orders))
}

#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = PlaceOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = ApiResponse<PlaceOrderResponse>),
        (status = 400, description = "Invalid checkout payload"),
    ),
    tag = "Orders"
)]
pub async fn place_order(
    State(state): State<AppState>,
    principal: Principal,
    Json(payload): Json<PlaceOrderRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<PlaceOrderResponse>>)> {
    let response = order_service::place_order(&state, &principal, payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    params(OrderListQuery),
    responses(
        (status = 200, description = "List orders", body = ApiResponse<OrderList>),
        (status = 401, description = "Not signed in"),
        (status = 403, description = "Not an admin"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    principal: Principal,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    order_service::list_orders(&state, &principal, query)
        .await
        .map(Json)
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Get order with items", body = ApiResponse<OrderWithItems>),
        (status = 404, description = "Order not found"),
    ),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    order_service::get_order(&state, id).await.map(Json)
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}/timeline",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order progress timeline", body = ApiResponse<OrderTimeline>),
        (status = 404, description = "Order not found"),
    ),
    tag = "Orders"
)]
pub async fn get_order_timeline(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderTimeline>>> {
    order_service::get_timeline(&state, id).await.map(Json)
}

#[utoipa::path(
    put,
    path = "/api/orders/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Order updated", body = ApiResponse<Order>),
        (status = 400, description = "Unknown status or illegal transition"),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    order_service::update_status(&state, &principal, id, payload)
        .await
        .map(Json)
}

#[utoipa::path(
    delete,
    path = "/api/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order deleted"),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn delete_order(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    order_service::delete_order(&state, &principal, id)
        .await
        .map(Json)
}

#[utoipa::path(
    get,
    path = "/api/customer/orders",
    params(
        ("limit" = Option<i64>, Query, description = "Max orders to return, default 50")
    ),
    responses(
        (status = 200, description = "Orders for the signed-in customer", body = ApiResponse<CustomerOrderList>),
        (status = 401, description = "Not signed in"),
        (status = 403, description = "Admin tokens cannot use the customer order view"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_customer_orders(
    State(state): State<AppState>,
    principal: Principal,
    Query(query): Query<CustomerOrdersQuery>,
) -> AppResult<Json<ApiResponse<CustomerOrderList>>> {
    order_service::list_customer_orders(&state, &principal, query)
        .await
        .map(Json)
}
