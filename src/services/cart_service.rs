use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::cart::{
        CartLine, CartLineProduct, CartSummary, MergeCartRequest, RemoveCartQuery,
        UpsertCartItemRequest,
    },
    error::{AppError, AppResult},
    middleware::auth::Principal,
    response::{ApiResponse, Meta},
    state::AppState,
};

#[derive(FromRow)]
struct CartRow {
    cart_id: Uuid,
    quantity: i32,
    product_id: Uuid,
    name: String,
    price: Decimal,
    image: String,
}

async fn fetch_summary(state: &AppState, user_id: Uuid) -> AppResult<CartSummary> {
    let rows = sqlx::query_as::<_, CartRow>(
        "SELECT c.id AS cart_id, c.quantity, p.id AS product_id, p.name, p.price, p.image \
         FROM cart_items c JOIN products p ON p.id = c.product_id \
         WHERE c.user_id = $1 ORDER BY c.created_at ASC",
    )
    .bind(user_id)
    .fetch_all(&state.pool)
    .await?;

    let mut total = Decimal::ZERO;
    let mut count = 0i64;
    let items = rows
        .into_iter()
        .map(|row| {
            total += row.price * Decimal::from(row.quantity);
            count += i64::from(row.quantity);
            CartLine {
                id: row.cart_id,
                quantity: row.quantity,
                product: CartLineProduct {
                    id: row.product_id,
                    name: row.name,
                    price: row.price,
                    image: row.image,
                },
            }
        })
        .collect();

    Ok(CartSummary {
        items,
        total,
        count,
    })
}

pub async fn list_cart(
    state: &AppState,
    principal: &Principal,
) -> AppResult<ApiResponse<CartSummary>> {
    let user_id = principal.require_customer()?;
    let summary = fetch_summary(state, user_id).await?;
    Ok(ApiResponse::success("OK", summary, Some(Meta::empty())))
}

/// Absolute-quantity upsert: the payload states what the line should hold,
/// and a quantity of zero or less removes the line. Every mutation returns
/// the refreshed summary so clients never have to derive totals themselves.
pub async fn upsert_item(
    state: &AppState,
    principal: &Principal,
    payload: UpsertCartItemRequest,
) -> AppResult<ApiResponse<CartSummary>> {
    let user_id = principal.require_customer()?;

    let product: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM products WHERE id = $1")
        .bind(payload.product_id)
        .fetch_optional(&state.pool)
        .await?;
    if product.is_none() {
        return Err(AppError::Validation(format!(
            "unknown product {}",
            payload.product_id
        )));
    }

    if payload.quantity <= 0 {
        sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND product_id = $2")
            .bind(user_id)
            .bind(payload.product_id)
            .execute(&state.pool)
            .await?;
    } else {
        sqlx::query(
            "INSERT INTO cart_items (id, user_id, product_id, quantity) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (user_id, product_id) DO UPDATE SET quantity = EXCLUDED.quantity",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(payload.product_id)
        .bind(payload.quantity)
        .execute(&state.pool)
        .await?;
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user_id),
        "cart_upsert",
        Some("cart_items"),
        Some(serde_json::json!({
            "product_id": payload.product_id,
            "quantity": payload.quantity,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let summary = fetch_summary(state, user_id).await?;
    Ok(ApiResponse::success("Cart updated", summary, Some(Meta::empty())))
}

/// Fold a guest cart into the account cart at sign-in. Quantities for lines
/// that already exist are summed rather than overwritten; lines pointing at
/// products that no longer exist are skipped.
pub async fn merge_cart(
    state: &AppState,
    principal: &Principal,
    payload: MergeCartRequest,
) -> AppResult<ApiResponse<CartSummary>> {
    let user_id = principal.require_customer()?;

    for line in &payload.items {
        if line.quantity < 1 {
            continue;
        }
        let product: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM products WHERE id = $1")
            .bind(line.product_id)
            .fetch_optional(&state.pool)
            .await?;
        if product.is_none() {
            tracing::debug!(product_id = %line.product_id, "skipping stale guest cart line");
            continue;
        }
        sqlx::query(
            "INSERT INTO cart_items (id, user_id, product_id, quantity) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (user_id, product_id) \
             DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(line.product_id)
        .bind(line.quantity)
        .execute(&state.pool)
        .await?;
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user_id),
        "cart_merge",
        Some("cart_items"),
        Some(serde_json::json!({ "lines": payload.items.len() })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let summary = fetch_summary(state, user_id).await?;
    Ok(ApiResponse::success("Cart merged", summary, Some(Meta::empty())))
}

/// Remove one line when `product_id` is given, otherwise empty the cart.
pub async fn remove_items(
    state: &AppState,
    principal: &Principal,
    query: RemoveCartQuery,
) -> AppResult<ApiResponse<CartSummary>> {
    let user_id = principal.require_customer()?;

    match query.product_id {
        Some(product_id) => {
            let result =
                sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND product_id = $2")
                    .bind(user_id)
                    .bind(product_id)
                    .execute(&state.pool)
                    .await?;
            if result.rows_affected() == 0 {
                return Err(AppError::NotFound);
            }
        }
        None => {
            sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
                .bind(user_id)
                .execute(&state.pool)
                .await?;
        }
    }

    let summary = fetch_summary(state, user_id).await?;
    Ok(ApiResponse::success("Cart updated", summary, Some(Meta::empty())))
}
