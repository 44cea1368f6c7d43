use axum::{
    Router,
    extract::{Path, Query, State},
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::{
        admin::{CouponStatsList, DashboardStats, LowStockQuery, OrderDetailList},
        coupons::{CouponList, CouponRequest},
        products::{CreateProductRequest, CreatedId, ProductList, UpdateProductRequest},
    },
    error::AppResult,
    extractors::ValidatedJson,
    middleware::auth::AuthUser,
    models::{Coupon, Product},
    response::{ApiResponse, Empty},
    routes::params::OrderListQuery,
    services::{admin_service, coupon_service, product_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", post(create_product))
        .route("/products/{id}", put(update_product).delete(delete_product))
        .route("/inventory/low-stock", get(list_low_stock))
        .route("/orders", get(list_all_orders))
        .route("/dashboard-stats", get(dashboard_stats))
        .route("/coupon-stats", get(coupon_stats))
        .route("/coupons", get(list_coupons).post(create_coupon))
        .route("/coupons/{id}", put(update_coupon).delete(delete_coupon))
}

#[utoipa::path(
    post,
    path = "/api/admin/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ApiResponse<CreatedId>),
        (status = 400, description = "Missing or invalid fields"),
        (status = 409, description = "Product name already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(payload): ValidatedJson<CreateProductRequest>,
) -> AppResult<ApiResponse<CreatedId>> {
    product_service::create_product(&state, &user, payload).await
}

#[utoipa::path(
    put,
    path = "/api/admin/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ApiResponse<Product>),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateProductRequest>,
) -> AppResult<ApiResponse<Product>> {
    product_service::update_product(&state, &user, id, payload).await
}

#[utoipa::path(
    delete,
    path = "/api/admin/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product deleted", body = ApiResponse<Empty>),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<Empty>> {
    product_service::delete_product(&state, &user, id).await
}

#[utoipa::path(
    get,
    path = "/api/admin/inventory/low-stock",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("threshold" = Option<i32>, Query, description = "Stock at or below this value, default 5")
    ),
    responses(
        (status = 200, description = "Low stock products", body = ApiResponse<ProductList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_low_stock(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<LowStockQuery>,
) -> AppResult<ApiResponse<ProductList>> {
    admin_service::list_low_stock(&state, &user, query).await
}

#[utoipa::path(
    get,
    path = "/api/admin/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("sort_order" = Option<String>, Query, description = "Sort order: asc, desc")
    ),
    responses(
        (status = 200, description = "All orders with customer and items", body = ApiResponse<OrderDetailList>),
        (status = 403, description = "Insufficient permissions")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_all_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<ApiResponse<OrderDetailList>> {
    admin_service::list_all_orders(&state, &user, query).await
}

#[utoipa::path(
    get,
    path = "/api/admin/dashboard-stats",
    responses(
        (status = 200, description = "Store totals", body = ApiResponse<DashboardStats>)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn dashboard_stats(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<ApiResponse<DashboardStats>> {
    admin_service::dashboard_stats(&state, &user).await
}

#[utoipa::path(
    get,
    path = "/api/admin/coupon-stats",
    responses(
        (status = 200, description = "Orders and sales per coupon", body = ApiResponse<CouponStatsList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn coupon_stats(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<ApiResponse<CouponStatsList>> {
    admin_service::coupon_stats(&state, &user).await
}

#[utoipa::path(
    get,
    path = "/api/admin/coupons",
    responses(
        (status = 200, description = "All coupons, newest first", body = ApiResponse<CouponList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_coupons(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<ApiResponse<CouponList>> {
    coupon_service::list_coupons(&state, &user).await
}

#[utoipa::path(
    post,
    path = "/api/admin/coupons",
    request_body = CouponRequest,
    responses(
        (status = 201, description = "Coupon created", body = ApiResponse<Coupon>),
        (status = 409, description = "Coupon code already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_coupon(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(payload): ValidatedJson<CouponRequest>,
) -> AppResult<ApiResponse<Coupon>> {
    coupon_service::create_coupon(&state, &user, payload).await
}

#[utoipa::path(
    put,
    path = "/api/admin/coupons/{id}",
    params(
        ("id" = Uuid, Path, description = "Coupon ID")
    ),
    request_body = CouponRequest,
    responses(
        (status = 200, description = "Coupon updated", body = ApiResponse<Coupon>),
        (status = 400, description = "Code change on a coupon that has been used"),
        (status = 404, description = "Coupon not found"),
        (status = 409, description = "Coupon code already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_coupon(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<CouponRequest>,
) -> AppResult<ApiResponse<Coupon>> {
    coupon_service::update_coupon(&state, &user, id, payload).await
}

#[utoipa::path(
    delete,
    path = "/api/admin/coupons/{id}",
    params(
        ("id" = Uuid, Path, description = "Coupon ID")
    ),
    responses(
        (status = 200, description = "Coupon deleted", body = ApiResponse<Empty>),
        (status = 404, description = "Coupon not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_coupon(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<Empty>> {
    coupon_service::delete_coupon(&state, &user, id).await
}
