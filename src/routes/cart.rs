use axum::{
    Router,
    extract::{Path, State},
    routing::{delete, get, put},
};
use uuid::Uuid;

use crate::{
    dto::cart::{AddToCartRequest, CartView, UpdateCartRequest},
    error::AppResult,
    extractors::ValidatedJson,
    middleware::auth::AuthUser,
    response::{ApiResponse, Empty},
    services::cart_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_cart).post(add_to_cart))
        .route("/update", put(update_cart_item))
        .route("/remove/{product_id}", delete(remove_from_cart))
}

#[utoipa::path(
    get,
    path = "/api/cart",
    responses(
        (status = 200, description = "Current cart", body = ApiResponse<CartView>),
        (status = 511, description = "Authentication required")
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn get_cart(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<ApiResponse<CartView>> {
    cart_service::get_cart(&state, &user).await
}

#[utoipa::path(
    post,
    path = "/api/cart",
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Item added", body = ApiResponse<CartView>),
        (status = 400, description = "Invalid quantity or insufficient stock"),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(payload): ValidatedJson<AddToCartRequest>,
) -> AppResult<ApiResponse<CartView>> {
    cart_service::add_to_cart(&state, &user, payload).await
}

#[utoipa::path(
    put,
    path = "/api/cart/update",
    request_body = UpdateCartRequest,
    responses(
        (status = 200, description = "Quantity replaced", body = ApiResponse<CartView>),
        (status = 400, description = "Invalid quantity or insufficient stock"),
        (status = 404, description = "Item not found in cart")
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn update_cart_item(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(payload): ValidatedJson<UpdateCartRequest>,
) -> AppResult<ApiResponse<CartView>> {
    cart_service::update_cart_item(&state, &user, payload).await
}

#[utoipa::path(
    delete,
    path = "/api/cart/remove/{product_id}",
    params(
        ("product_id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Item removed", body = ApiResponse<Empty>),
        (status = 404, description = "Cart not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<ApiResponse<Empty>> {
    cart_service::remove_from_cart(&state, &user, product_id).await
}
