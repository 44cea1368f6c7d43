use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};

use crate::{
    dto::{
        admin::{CouponStats, CouponStatsList, DashboardStats, LowStockQuery, OrderDetailList},
        products::ProductList,
    },
    entity::{
        orders::{Column as OrderCol, Entity as Orders},
        products::{Column as ProdCol, Entity as Products},
    },
    error::AppResult,
    middleware::auth::{AuthUser, ensure_admin},
    models::Product,
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::order_service::attach_details,
    state::AppState,
};

pub const DEFAULT_LOW_STOCK_THRESHOLD: i32 = 5;

/// Every order with its customer and items.
pub async fn list_all_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderDetailList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(status) = query.status_filter()? {
        condition = condition.add(OrderCol::Status.eq(status.as_str()));
    }

    let mut finder = Orders::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let items = attach_details(&state.orm, orders, state.config.transition_policy).await?;

    Ok(ApiResponse::success(
        "Orders fetched successfully",
        OrderDetailList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

#[derive(sqlx::FromRow)]
struct DashboardRow {
    total_products: i64,
    total_users: i64,
    total_orders: i64,
    total_revenue: i64,
    recent_orders: i64,
    active_coupons: i64,
}

/// Revenue leaves out cancelled orders.
pub async fn dashboard_stats(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<DashboardStats>> {
    ensure_admin(user)?;

    let row = sqlx::query_as::<_, DashboardRow>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM products) AS total_products,
            (SELECT COUNT(*) FROM users WHERE role = 'user') AS total_users,
            (SELECT COUNT(*) FROM orders) AS total_orders,
            (SELECT COALESCE(SUM(total_amount), 0)::BIGINT FROM orders
                WHERE status <> 'cancelled') AS total_revenue,
            (SELECT COUNT(*) FROM orders
                WHERE created_at >= now() - INTERVAL '7 days') AS recent_orders,
            (SELECT COUNT(*) FROM coupons WHERE is_active) AS active_coupons
        "#,
    )
    .fetch_one(&state.pool)
    .await?;

    Ok(ApiResponse::success(
        "Dashboard stats fetched successfully",
        DashboardStats {
            total_products: row.total_products,
            total_users: row.total_users,
            total_orders: row.total_orders,
            total_revenue: row.total_revenue,
            recent_orders: row.recent_orders,
            active_coupons: row.active_coupons,
        },
        None,
    ))
}

#[derive(sqlx::FromRow)]
struct CouponStatsRow {
    id: uuid::Uuid,
    code: String,
    influencer_name: String,
    discount: i32,
    is_active: bool,
    usage_count: i64,
    order_count: i64,
    total_sales: i64,
}

pub async fn coupon_stats(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<CouponStatsList>> {
    ensure_admin(user)?;

    let rows = sqlx::query_as::<_, CouponStatsRow>(
        r#"
        SELECT
            c.id,
            c.code,
            c.influencer_name,
            c.discount,
            c.is_active,
            c.usage_count,
            COUNT(o.id) AS order_count,
            COALESCE(SUM(o.total_amount), 0)::BIGINT AS total_sales
        FROM coupons c
        LEFT JOIN orders o ON o.coupon_code = c.code
        GROUP BY c.id
        ORDER BY order_count DESC, c.code ASC
        "#,
    )
    .fetch_all(&state.pool)
    .await?;

    let items = rows
        .into_iter()
        .map(|row| CouponStats {
            id: row.id,
            code: row.code,
            influencer_name: row.influencer_name,
            discount: row.discount,
            is_active: row.is_active,
            usage_count: row.usage_count,
            order_count: row.order_count,
            total_sales: row.total_sales,
        })
        .collect();

    Ok(ApiResponse::success(
        "Coupon stats fetched successfully",
        CouponStatsList { items },
        None,
    ))
}

/// Products at or below the threshold, scarcest first. Includes inactive products.
pub async fn list_low_stock(
    state: &AppState,
    user: &AuthUser,
    query: LowStockQuery,
) -> AppResult<ApiResponse<ProductList>> {
    ensure_admin(user)?;
    let threshold = query.threshold.unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD);
    let (page, limit, offset) = query.pagination().normalize();

    let finder = Products::find()
        .filter(ProdCol::Stock.lte(threshold))
        .order_by_asc(ProdCol::Stock)
        .order_by_desc(ProdCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    Ok(ApiResponse::success(
        "Low stock products fetched successfully",
        ProductList { items },
        Some(Meta::new(page, limit, total)),
    ))
}
