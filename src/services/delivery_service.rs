use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};

use crate::{
    domain::order_status::OrderStatus,
    dto::admin::OrderDetailList,
    entity::orders::{Column as OrderCol, Entity as Orders},
    error::AppResult,
    middleware::auth::{AuthUser, ensure_staff},
    response::{ApiResponse, Meta},
    routes::params::OrderListQuery,
    services::order_service::attach_details,
    state::AppState,
};

/// Open orders, oldest first, for the delivery dashboard.
///
/// A terminal status filter returns an empty queue.
pub async fn list_queue(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderDetailList>> {
    ensure_staff(user)?;
    let (page, limit, offset) = query.pagination().normalize();

    let open: Vec<&'static str> = OrderStatus::non_terminal().map(|s| s.as_str()).collect();
    let mut condition = Condition::all().add(OrderCol::Status.is_in(open));
    if let Some(status) = query.status_filter()? {
        condition = condition.add(OrderCol::Status.eq(status.as_str()));
    }

    let finder = Orders::find()
        .filter(condition)
        .order_by_asc(OrderCol::CreatedAt)
        .order_by_asc(OrderCol::Id);

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let items = attach_details(&state.orm, orders, state.config.transition_policy).await?;

    Ok(ApiResponse::success(
        "Delivery orders fetched successfully",
        OrderDetailList { items },
        Some(Meta::new(page, limit, total)),
    ))
}
