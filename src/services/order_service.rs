use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use sqlx::FromRow;
use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::orders::{
        CustomerOrder, CustomerOrderItem, CustomerOrderList, CustomerOrdersQuery, OrderList,
        OrderTimeline, OrderWithItems, PlaceOrderRequest, PlaceOrderResponse,
        UpdateOrderStatusRequest,
    },
    entity::{
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        orders::{
            ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel,
        },
        products::{Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::Principal,
    models::{Order, OrderItem},
    notify::{LineSnapshot, OrderSnapshot},
    order_status::{self, OrderStatus},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    state::AppState,
};

/// Short human-facing handle used in emails, chat messages and UPI notes.
pub fn order_reference(order_id: Uuid) -> String {
    let id = order_id.to_string();
    format!("ORD-{}", &id[..8])
}

/// Validate and persist a checkout. The order row and its N item rows are
/// written in one transaction; a signed-in customer is stamped as the owner
/// while admin or anonymous sessions produce a guest order. Notification
/// fan-out happens after commit and can never fail the placement.
pub async fn place_order(
    state: &AppState,
    principal: &Principal,
    payload: PlaceOrderRequest,
) -> AppResult<ApiResponse<PlaceOrderResponse>> {
    if payload.customer_name.trim().is_empty() {
        return Err(AppError::Validation("customer_name is required".into()));
    }
    if payload.customer_email.trim().is_empty() {
        return Err(AppError::Validation("customer_email is required".into()));
    }
    if payload.items.is_empty() {
        return Err(AppError::Validation("order has no items".into()));
    }

    let mut computed_total = Decimal::ZERO;
    for item in &payload.items {
        if item.quantity < 1 {
            return Err(AppError::Validation(
                "item quantity must be at least 1".into(),
            ));
        }
        if item.price < Decimal::ZERO {
            return Err(AppError::Validation("item price must not be negative".into()));
        }
        computed_total += item.price * Decimal::from(item.quantity);
    }
    if computed_total != payload.total {
        return Err(AppError::Validation(format!(
            "total {} does not match line items ({})",
            payload.total, computed_total
        )));
    }

    let txn = state.orm.begin().await?;

    // Resolve product names inside the transaction so the notification
    // snapshot reflects the catalog exactly as it was at placement time.
    let ids: Vec<Uuid> = payload.items.iter().map(|i| i.product_id).collect();
    let names: HashMap<Uuid, String> = Products::find()
        .filter(ProdCol::Id.is_in(ids))
        .all(&txn)
        .await?
        .into_iter()
        .map(|p| (p.id, p.name))
        .collect();
    for item in &payload.items {
        if !names.contains_key(&item.product_id) {
            return Err(AppError::Validation(format!(
                "unknown product {}",
                item.product_id
            )));
        }
    }

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(principal.customer_id()),
        customer_name: Set(payload.customer_name.trim().to_string()),
        customer_email: Set(payload.customer_email.trim().to_string()),
        customer_phone: Set(payload.customer_phone.clone()),
        shipping_address: Set(payload.shipping_address.clone()),
        total: Set(payload.total),
        status: Set(OrderStatus::Pending.to_string()),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut lines = Vec::with_capacity(payload.items.len());
    for item in &payload.items {
        OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(item.product_id),
            quantity: Set(item.quantity),
            price: Set(item.price),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;

        lines.push(LineSnapshot {
            name: names[&item.product_id].clone(),
            quantity: item.quantity,
            price: item.price,
        });
    }

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        principal.actor_id(),
        "order_place",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "total": order.total })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let reference = order_reference(order.id);
    state.notifier.dispatch(OrderSnapshot {
        order_id: order.id,
        reference: reference.clone(),
        customer_name: order.customer_name.clone(),
        customer_email: order.customer_email.clone(),
        customer_phone: order.customer_phone.clone(),
        shipping_address: order.shipping_address.clone(),
        total: order.total,
        status: order.status.clone(),
        created_at: order.created_at.with_timezone(&Utc),
        lines,
    });

    Ok(ApiResponse::success(
        "Order placed successfully. Please complete the payment using the UPI QR code sent to your email.",
        PlaceOrderResponse {
            order_id: order.id,
            reference,
        },
        Some(Meta::empty()),
    ))
}

pub async fn list_orders(
    state: &AppState,
    principal: &Principal,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    principal.require_admin()?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        if OrderStatus::parse(status).is_none() {
            return Err(AppError::Validation("Invalid order status".into()));
        }
        condition = condition.add(OrderCol::Status.eq(status.clone()));
    }

    let mut finder = Orders::find().filter(condition);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect::<AppResult<Vec<Order>>>()?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Orders",
        OrderList { items: orders },
        Some(meta),
    ))
}

/// Public read: the order-success page fetches by id without a session.
pub async fn get_order(state: &AppState, id: Uuid) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_item_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "OK",
        OrderWithItems {
            order: order_from_entity(order)?,
            items,
        },
        Some(Meta::empty()),
    ))
}

pub async fn get_timeline(state: &AppState, id: Uuid) -> AppResult<ApiResponse<OrderTimeline>> {
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let status = status_from_db(&order.status)?;

    Ok(ApiResponse::success(
        "OK",
        OrderTimeline {
            status,
            cancelled: status == OrderStatus::Cancelled,
            steps: order_status::timeline(status),
        },
        Some(Meta::empty()),
    ))
}

#[derive(FromRow)]
struct CustomerOrderRow {
    id: Uuid,
    total: Decimal,
    status: String,
    created_at: chrono::DateTime<Utc>,
}

#[derive(FromRow)]
struct CustomerItemRow {
    order_id: Uuid,
    product_id: Uuid,
    quantity: i32,
    price: Decimal,
    name: String,
    image: String,
}

/// "My orders" for the account page. Admins have their own read path and
/// are turned away here.
pub async fn list_customer_orders(
    state: &AppState,
    principal: &Principal,
    query: CustomerOrdersQuery,
) -> AppResult<ApiResponse<CustomerOrderList>> {
    let user_id = principal.require_customer()?;
    let limit = query.limit.unwrap_or(50).clamp(1, 100);

    let rows = sqlx::query_as::<_, CustomerOrderRow>(
        "SELECT id, total, status, created_at FROM orders \
         WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2",
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(&state.pool)
    .await?;

    let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
    let item_rows = sqlx::query_as::<_, CustomerItemRow>(
        "SELECT oi.order_id, oi.product_id, oi.quantity, oi.price, p.name, p.image \
         FROM order_items oi JOIN products p ON p.id = oi.product_id \
         WHERE oi.order_id = ANY($1)",
    )
    .bind(&ids)
    .fetch_all(&state.pool)
    .await?;

    let mut items_by_order: HashMap<Uuid, Vec<CustomerOrderItem>> = HashMap::new();
    for row in item_rows {
        items_by_order
            .entry(row.order_id)
            .or_default()
            .push(CustomerOrderItem {
                product_id: row.product_id,
                product_name: row.name,
                product_image: row.image,
                quantity: row.quantity,
                price: row.price,
            });
    }

    let orders = rows
        .into_iter()
        .map(|row| {
            Ok(CustomerOrder {
                items: items_by_order.remove(&row.id).unwrap_or_default(),
                status: status_from_db(&row.status)?,
                id: row.id,
                total: row.total,
                created_at: row.created_at,
            })
        })
        .collect::<AppResult<Vec<CustomerOrder>>>()?;

    Ok(ApiResponse::success(
        "OK",
        CustomerOrderList { orders },
        Some(Meta::empty()),
    ))
}

/// Admin-driven status transition, checked against the transition graph:
/// forward jumps only, cancel from any non-terminal state.
pub async fn update_status(
    state: &AppState,
    principal: &Principal,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    let admin_id = principal.require_admin()?;
    let next = OrderStatus::parse(&payload.status)
        .ok_or_else(|| AppError::Validation("Invalid order status".into()))?;

    let existing = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let current = status_from_db(&existing.status)?;

    if !current.can_transition(next) {
        return Err(AppError::Validation(format!(
            "illegal status transition: {current} -> {next}"
        )));
    }

    let mut active: OrderActive = existing.into();
    active.status = Set(next.to_string());
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(admin_id),
        "order_status_update",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "status": order.status })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order updated",
        order_from_entity(order)?,
        Some(Meta::empty()),
    ))
}

pub async fn delete_order(
    state: &AppState,
    principal: &Principal,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let admin_id = principal.require_admin()?;

    let result = Orders::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(admin_id),
        "order_delete",
        Some("orders"),
        Some(serde_json::json!({ "order_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

fn status_from_db(value: &str) -> AppResult<OrderStatus> {
    OrderStatus::parse(value)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("invalid order status in database: {value}")))
}

fn order_from_entity(model: OrderModel) -> AppResult<Order> {
    Ok(Order {
        status: status_from_db(&model.status)?,
        id: model.id,
        user_id: model.user_id,
        customer_name: model.customer_name,
        customer_email: model.customer_email,
        customer_phone: model.customer_phone,
        shipping_address: model.shipping_address,
        total: model.total,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

fn order_item_from_entity(model: OrderItemModel) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        product_id: model.product_id,
        quantity: model.quantity,
        price: model.price,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_reference_is_short_and_stable() {
        let id = Uuid::parse_str("1a2b3c4d-0000-0000-0000-000000000000").unwrap();
        assert_eq!(order_reference(id), "ORD-1a2b3c4d");
    }
}
