use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::{
    domain::tracking::{current_location, delivery_agent, estimated_delivery, sort_newest_first},
    dto::tracking::TrackingView,
    entity::{
        orders::Entity as Orders,
        tracking_events::{Column as EventCol, Entity as TrackingEvents},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::TrackingEvent,
    response::ApiResponse,
    services::order_service::order_with_items,
    state::AppState,
};

/// Order, items and timeline as the tracking page shows them.
///
/// Customers only see their own orders; anyone else gets the same 404 as for
/// a missing order.
pub async fn get_timeline(
    state: &AppState,
    user: &AuthUser,
    order_id: Uuid,
) -> AppResult<ApiResponse<TrackingView>> {
    let model = Orders::find_by_id(order_id)
        .one(&state.orm)
        .await?
        .filter(|o| o.user_id == user.user_id || user.role.is_staff())
        .ok_or_else(|| AppError::not_found("Order"))?;

    let mut events = TrackingEvents::find()
        .filter(EventCol::OrderId.eq(order_id))
        .order_by_desc(EventCol::OccurredAt)
        .order_by_desc(EventCol::Seq)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(TrackingEvent::try_from)
        .collect::<AppResult<Vec<_>>>()?;
    sort_newest_first(&mut events);

    let order = order_with_items(&state.orm, model).await?;
    let eta = estimated_delivery(order.order.created_at, state.config.estimated_delivery_days)
        .ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "estimated delivery out of range for order {order_id}"
            ))
        })?;
    let view = TrackingView {
        estimated_delivery: eta,
        current_location: current_location(&events),
        delivery_agent: delivery_agent(order.order.status, &events),
        order,
        events,
    };

    Ok(ApiResponse::success(
        "Tracking fetched successfully",
        view,
        None,
    ))
}
