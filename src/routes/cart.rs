use axum::{
    Json, Router,
    extract::{Query, State},
};

use crate::{
    dto::cart::{CartSummary, MergeCartRequest, RemoveCartQuery, UpsertCartItemRequest},
    error::AppResult,
    middleware::auth::Principal,
    response::ApiResponse,
    services::cart_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::get(cart_list))
        .route("/", axum::routing::post(upsert_cart_item))
        .route("/", axum::routing::delete(remove_cart_items))
        .route("/merge", axum::routing::post(merge_cart))
}

#[utoipa::path(
    get,
    path = "/api/cart",
    responses(
        (status = 200, description = "Cart with derived totals", body = ApiResponse<CartSummary>),
        (status = 401, description = "Not signed in"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn cart_list(
    State(state): State<AppState>,
    principal: Principal,
) -> AppResult<Json<ApiResponse<CartSummary>>> {
    cart_service::list_cart(&state, &principal).await.map(Json)
}

#[utoipa::path(
    post,
    path = "/api/cart",
    request_body = UpsertCartItemRequest,
    responses(
        (status = 200, description = "Line upserted, summary returned", body = ApiResponse<CartSummary>),
        (status = 400, description = "Unknown product"),
        (status = 401, description = "Not signed in"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn upsert_cart_item(
    State(state): State<AppState>,
    principal: Principal,
    Json(payload): Json<UpsertCartItemRequest>,
) -> AppResult<Json<ApiResponse<CartSummary>>> {
    cart_service::upsert_item(&state, &principal, payload)
        .await
        .map(Json)
}

#[utoipa::path(
    post,
    path = "/api/cart/merge",
    request_body = MergeCartRequest,
    responses(
        (status = 200, description = "Guest cart folded into the account cart", body = ApiResponse<CartSummary>),
        (status = 401, description = "Not signed in"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn merge_cart(
    State(state): State<AppState>,
    principal: Principal,
    Json(payload): Json<MergeCartRequest>,
) -> AppResult<Json<ApiResponse<CartSummary>>> {
    cart_service::merge_cart(&state, &principal, payload)
        .await
        .map(Json)
}

#[utoipa::path(
    delete,
    path = "/api/cart",
    params(
        ("product_id" = Option<Uuid>, Query, description = "Line to remove; clears the cart when omitted")
    ),
    responses(
        (status = 200, description = "Cart updated", body = ApiResponse<CartSummary>),
        (status = 404, description = "Line not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn remove_cart_items(
    State(state): State<AppState>,
    principal: Principal,
    Query(query): Query<RemoveCartQuery>,
) -> AppResult<Json<ApiResponse<CartSummary>>> {
    cart_service::remove_items(&state, &principal, query)
        .await
        .map(Json)
}
