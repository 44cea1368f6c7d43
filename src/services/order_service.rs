use std::collections::HashMap;

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    domain::{
        order_status::{OrderStatus, TransitionPolicy},
        pricing::{order_totals, subtotal},
        tracking::{ORDER_RECEIVED, SYSTEM_ACTOR},
    },
    dto::{
        admin::{CustomerSummary, OrderDetail},
        orders::{
            OrderList, OrderWithItems, PlaceOrderRequest, PlacedOrder, StatusUpdate,
            UpdateStatusRequest,
        },
    },
    entity::{
        cart_items::{Column as CartItemCol, Entity as CartItems},
        carts::{Column as CartCol, Entity as Carts},
        coupons::{Column as CouponCol, Entity as Coupons},
        order_items::{ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        products::{Column as ProdCol, Entity as Products},
        tracking_events::ActiveModel as EventActive,
        users::{Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_staff},
    models::{Order, OrderItem, TrackingEvent, parse_status},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::coupon_service::find_active,
    state::AppState,
};

struct Line {
    product_id: Uuid,
    name: String,
    category: String,
    image_url: Option<String>,
    unit_price: i64,
    quantity: i32,
}

/// Turns the caller's cart into a `pending` order.
///
/// Everything happens in one transaction: coupon usage, stock reservation,
/// the order, its item snapshot, the first tracking event and the cart
/// deletion either all land or none do. The cart row is locked before its
/// items are read, then product rows are locked in id order, so a second
/// checkout of the same cart waits and then finds it gone.
///
/// An unknown or inactive coupon code is ignored and the order is placed at
/// full price.
pub async fn place_order(
    state: &AppState,
    user: &AuthUser,
    payload: PlaceOrderRequest,
) -> AppResult<ApiResponse<PlacedOrder>> {
    let checkout = payload.validate()?;

    let txn = state.orm.begin().await?;

    let cart = Carts::find()
        .filter(CartCol::UserId.eq(user.user_id))
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::InvalidState("Cart is empty".into()))?;

    let cart_items = CartItems::find()
        .filter(CartItemCol::CartId.eq(cart.id))
        .all(&txn)
        .await?;
    if cart_items.is_empty() {
        return Err(AppError::InvalidState("Cart is empty".into()));
    }

    let quantities: HashMap<Uuid, i32> = cart_items
        .iter()
        .map(|item| (item.product_id, item.quantity))
        .collect();

    let products = Products::find()
        .filter(ProdCol::Id.is_in(quantities.keys().copied()))
        .order_by_asc(ProdCol::Id)
        .lock(LockType::Update)
        .all(&txn)
        .await?;

    let mut lines = Vec::with_capacity(products.len());
    for product in products {
        if !product.is_active {
            return Err(AppError::InvalidState(format!(
                "{} is no longer available",
                product.name
            )));
        }
        let quantity = quantities.get(&product.id).copied().unwrap_or_default();
        if quantity > product.stock {
            return Err(AppError::InsufficientStock(format!(
                "Only {} of {} left in stock",
                product.stock, product.name
            )));
        }
        lines.push(Line {
            product_id: product.id,
            name: product.name,
            category: product.category,
            image_url: product.image_url,
            unit_price: product.price,
            quantity,
        });
    }
    if lines.is_empty() {
        return Err(AppError::InvalidState("Cart is empty".into()));
    }

    let coupon = match checkout.coupon_code.as_deref() {
        Some(code) => {
            let found = find_active(&txn, code).await?;
            if found.is_none() {
                tracing::debug!(code, "coupon unknown or inactive, charging full price");
            }
            found
        }
        None => None,
    };
    if let Some(coupon) = &coupon {
        Coupons::update_many()
            .col_expr(CouponCol::UsageCount, Expr::col(CouponCol::UsageCount).add(1))
            .filter(CouponCol::Id.eq(coupon.id))
            .exec(&txn)
            .await?;
        tracing::info!(code = %coupon.code, discount = coupon.discount, "coupon applied");
    }

    let totals = order_totals(
        subtotal(lines.iter().map(|l| (l.unit_price, l.quantity))),
        coupon.as_ref().map(|c| c.discount),
    );

    for line in &lines {
        let reserved = Products::update_many()
            .col_expr(ProdCol::Stock, Expr::col(ProdCol::Stock).sub(line.quantity))
            .filter(ProdCol::Id.eq(line.product_id))
            .filter(ProdCol::Stock.gte(line.quantity))
            .exec(&txn)
            .await?;
        if reserved.rows_affected == 0 {
            return Err(AppError::InsufficientStock(format!(
                "Not enough stock for {}",
                line.name
            )));
        }
    }

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        subtotal_amount: Set(totals.subtotal),
        discount_amount: Set(totals.discount),
        total_amount: Set(totals.total),
        coupon_code: Set(coupon.map(|c| c.code)),
        status: Set(OrderStatus::Pending.as_str().to_string()),
        shipping_address: Set(checkout.shipping_address),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    OrderItems::insert_many(lines.iter().map(|line| OrderItemActive {
        id: Set(Uuid::new_v4()),
        order_id: Set(order.id),
        product_id: Set(line.product_id),
        product_name: Set(line.name.clone()),
        product_category: Set(line.category.clone()),
        product_image_url: Set(line.image_url.clone()),
        unit_price: Set(line.unit_price),
        quantity: Set(line.quantity),
        created_at: NotSet,
    }))
    .exec(&txn)
    .await?;

    EventActive {
        id: Set(Uuid::new_v4()),
        seq: NotSet,
        order_id: Set(order.id),
        status: Set(OrderStatus::Pending.as_str().to_string()),
        message: Set(ORDER_RECEIVED.to_string()),
        location: Set(None),
        updated_by_id: Set(None),
        updated_by_name: Set(SYSTEM_ACTOR.to_string()),
        updated_by_role: Set(SYSTEM_ACTOR.to_string()),
        occurred_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let removed = Carts::delete_by_id(cart.id).exec(&txn).await?;
    if removed.rows_affected == 0 {
        return Err(AppError::InvalidState("Cart is empty".into()));
    }

    txn.commit().await?;

    tracing::info!(
        order_id = %order.id,
        user_id = %user.user_id,
        total = totals.total,
        "order placed"
    );

    audit::record(
        &state.pool,
        user.user_id,
        "order_place",
        "orders",
        serde_json::json!({
            "order_id": order.id,
            "total_amount": totals.total,
            "coupon_code": order.coupon_code,
        }),
    )
    .await;

    Ok(ApiResponse::created(
        "Order placed successfully",
        PlacedOrder {
            order_id: order.id,
            subtotal_amount: totals.subtotal,
            discount_amount: totals.discount,
            total_amount: totals.total,
        },
    ))
}

/// Moves an order to a new status and appends the matching tracking event.
///
/// The order row stays locked until the event is written, so concurrent
/// updates to the same order are serialized.
pub async fn transition_status(
    state: &AppState,
    user: &AuthUser,
    order_id: Uuid,
    payload: UpdateStatusRequest,
) -> AppResult<ApiResponse<StatusUpdate>> {
    ensure_staff(user)?;
    let change = payload.validate()?;

    let txn = state.orm.begin().await?;

    let existing = Orders::find_by_id(order_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("Order"))?;

    let from = parse_status(&existing.status)?;
    state
        .config
        .transition_policy
        .check(from, change.status)
        .map_err(|err| AppError::InvalidState(err.to_string()))?;

    let mut active: OrderActive = existing.into();
    active.status = Set(change.status.as_str().to_string());
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&txn).await?;

    if change.status == OrderStatus::Cancelled {
        release_stock(&txn, order.id).await?;
    }

    let event = EventActive {
        id: Set(Uuid::new_v4()),
        seq: NotSet,
        order_id: Set(order.id),
        status: Set(change.status.as_str().to_string()),
        message: Set(change.message),
        location: Set(change.location),
        updated_by_id: Set(Some(user.user_id)),
        updated_by_name: Set(user.name.clone()),
        updated_by_role: Set(user.role.as_str().to_string()),
        occurred_at: NotSet,
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    tracing::info!(
        order_id = %order.id,
        %from,
        to = %change.status,
        actor = %user.user_id,
        "order status changed"
    );

    audit::record(
        &state.pool,
        user.user_id,
        "order_status_update",
        "orders",
        serde_json::json!({ "order_id": order.id, "from": from, "to": change.status }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order status updated successfully",
        StatusUpdate {
            order: Order::try_from(order)?,
            event: TrackingEvent::try_from(event)?,
        },
        None,
    ))
}

/// Puts the reserved quantities back. Deleted products are skipped.
async fn release_stock<C: ConnectionTrait>(conn: &C, order_id: Uuid) -> AppResult<()> {
    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order_id))
        .all(conn)
        .await?;
    for item in items {
        Products::update_many()
            .col_expr(ProdCol::Stock, Expr::col(ProdCol::Stock).add(item.quantity))
            .filter(ProdCol::Id.eq(item.product_id))
            .exec(conn)
            .await?;
    }
    Ok(())
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all().add(OrderCol::UserId.eq(user.user_id));
    if let Some(status) = query.status_filter()? {
        condition = condition.add(OrderCol::Status.eq(status.as_str()));
    }

    let mut finder = Orders::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Order::try_from)
        .collect::<AppResult<Vec<_>>>()?;

    Ok(ApiResponse::success(
        "Orders fetched successfully",
        OrderList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let model = Orders::find_by_id(id)
        .filter(OrderCol::UserId.eq(user.user_id))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Order"))?;

    let data = order_with_items(&state.orm, model).await?;
    Ok(ApiResponse::success("Order fetched successfully", data, None))
}

pub(crate) async fn order_with_items<C: ConnectionTrait>(
    conn: &C,
    model: OrderModel,
) -> AppResult<OrderWithItems> {
    let mut items = load_items(conn, &[model.id]).await?;
    let order = Order::try_from(model)?;
    Ok(OrderWithItems {
        items: items.remove(&order.id).unwrap_or_default(),
        order,
    })
}

/// Item snapshots for a batch of orders, grouped by order id.
pub(crate) async fn load_items<C: ConnectionTrait>(
    conn: &C,
    order_ids: &[Uuid],
) -> AppResult<HashMap<Uuid, Vec<OrderItem>>> {
    let mut grouped: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
    if order_ids.is_empty() {
        return Ok(grouped);
    }
    let rows = OrderItems::find()
        .filter(OrderItemCol::OrderId.is_in(order_ids.iter().copied()))
        .order_by_asc(OrderItemCol::ProductName)
        .all(conn)
        .await?;
    for row in rows {
        grouped.entry(row.order_id).or_default().push(OrderItem::from(row));
    }
    Ok(grouped)
}

/// Joins a page of orders with their customers and items in two batch queries.
pub(crate) async fn attach_details<C: ConnectionTrait>(
    conn: &C,
    orders: Vec<OrderModel>,
    policy: TransitionPolicy,
) -> AppResult<Vec<OrderDetail>> {
    let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let mut user_ids: Vec<Uuid> = orders.iter().map(|o| o.user_id).collect();
    user_ids.sort_unstable();
    user_ids.dedup();

    let customers: HashMap<Uuid, CustomerSummary> = if user_ids.is_empty() {
        HashMap::new()
    } else {
        Users::find()
            .filter(UserCol::Id.is_in(user_ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|u| {
                (
                    u.id,
                    CustomerSummary {
                        id: u.id,
                        name: u.name,
                        email: u.email,
                        phone: u.phone,
                    },
                )
            })
            .collect()
    };

    let mut items = load_items(conn, &order_ids).await?;

    orders
        .into_iter()
        .map(|model| -> AppResult<OrderDetail> {
            let order = Order::try_from(model)?;
            Ok(OrderDetail {
                items: items.remove(&order.id).unwrap_or_default(),
                user: customers.get(&order.user_id).cloned(),
                next_statuses: policy.allowed_targets(order.status),
                order,
            })
        })
        .collect()
}
