use axum::{
    Router,
    extract::{Path, Query, State},
    routing::{get, put},
};
use uuid::Uuid;

use crate::{
    dto::{
        admin::OrderDetailList,
        orders::{OrderList, OrderWithItems, PlaceOrderRequest, PlacedOrder, StatusUpdate, UpdateStatusRequest},
        tracking::TrackingView,
    },
    error::AppResult,
    extractors::ValidatedJson,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::OrderListQuery,
    services::{delivery_service, order_service, tracking_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders).post(place_order))
        .route("/{id}", get(get_order))
        .route("/{id}/tracking", get(get_tracking))
        .route("/{id}/update-status", put(update_status))
}

pub fn delivery_router() -> Router<AppState> {
    Router::new().route("/orders", get(delivery_queue))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("sort_order" = Option<String>, Query, description = "Sort order: asc, desc")
    ),
    responses(
        (status = 200, description = "Own orders", body = ApiResponse<OrderList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<ApiResponse<OrderList>> {
    order_service::list_orders(&state, &user, query).await
}

#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = PlaceOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = ApiResponse<PlacedOrder>),
        (status = 400, description = "Empty cart, missing address or insufficient stock")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn place_order(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(payload): ValidatedJson<PlaceOrderRequest>,
) -> AppResult<ApiResponse<PlacedOrder>> {
    order_service::place_order(&state, &user, payload).await
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order with items", body = ApiResponse<OrderWithItems>),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<OrderWithItems>> {
    order_service::get_order(&state, &user, id).await
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}/tracking",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order timeline", body = ApiResponse<TrackingView>),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn get_tracking(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<TrackingView>> {
    tracking_service::get_timeline(&state, &user, id).await
}

#[utoipa::path(
    put,
    path = "/api/orders/{id}/update-status",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = ApiResponse<StatusUpdate>),
        (status = 400, description = "Invalid status or transition"),
        (status = 403, description = "Insufficient permissions"),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn update_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateStatusRequest>,
) -> AppResult<ApiResponse<StatusUpdate>> {
    order_service::transition_status(&state, &user, id, payload).await
}

#[utoipa::path(
    get,
    path = "/api/delivery/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "Filter by open status")
    ),
    responses(
        (status = 200, description = "Open orders, oldest first", body = ApiResponse<OrderDetailList>),
        (status = 403, description = "Insufficient permissions")
    ),
    security(("bearer_auth" = [])),
    tag = "Delivery"
)]
pub async fn delivery_queue(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<ApiResponse<OrderDetailList>> {
    delivery_service::list_queue(&state, &user, query).await
}
