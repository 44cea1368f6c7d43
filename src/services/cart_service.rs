use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    audit,
    db::DbPool,
    domain::pricing::line_total,
    dto::cart::{AddToCartRequest, CartItemDto, CartView, UpdateCartRequest},
    entity::{
        cart_items::{Column as ItemCol, Entity as CartItems},
        carts::{Column as CartCol, Entity as Carts, Model as CartModel},
        products::{Entity as Products, Model as ProductModel},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Product,
    response::{ApiResponse, Empty},
    state::AppState,
};

async fn find_cart<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> AppResult<Option<CartModel>> {
    Ok(Carts::find()
        .filter(CartCol::UserId.eq(user_id))
        .one(conn)
        .await?)
}

/// Creates the cart on first use. Concurrent callers converge on one row.
async fn ensure_cart(pool: &DbPool, user_id: Uuid) -> AppResult<Uuid> {
    let cart_id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO carts (id, user_id)
        VALUES ($1, $2)
        ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok(cart_id)
}

/// Cart lines joined with their products, oldest line first.
pub(crate) async fn cart_lines<C: ConnectionTrait>(
    conn: &C,
    cart_id: Uuid,
) -> AppResult<Vec<(i32, ProductModel)>> {
    let rows = CartItems::find()
        .filter(ItemCol::CartId.eq(cart_id))
        .order_by_asc(ItemCol::CreatedAt)
        .find_also_related(Products)
        .all(conn)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(item, product)| product.map(|p| (item.quantity, p)))
        .collect())
}

async fn cart_view<C: ConnectionTrait>(conn: &C, cart_id: Uuid) -> AppResult<CartView> {
    let items: Vec<CartItemDto> = cart_lines(conn, cart_id)
        .await?
        .into_iter()
        .map(|(quantity, product)| CartItemDto {
            product_id: product.id,
            quantity,
            line_total: line_total(product.price, quantity),
            product: Product::from(product),
        })
        .collect();
    let subtotal = items.iter().map(|item| item.line_total).sum();
    Ok(CartView { items, subtotal })
}

async fn active_product(state: &AppState, product_id: Uuid) -> AppResult<ProductModel> {
    Products::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .filter(|p| p.is_active)
        .ok_or_else(|| AppError::not_found("Product"))
}

pub async fn get_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartView>> {
    let Some(cart) = find_cart(&state.orm, user.user_id).await? else {
        return Ok(ApiResponse::success("Cart is empty", CartView::empty(), None));
    };
    let view = cart_view(&state.orm, cart.id).await?;
    Ok(ApiResponse::success("Cart fetched successfully", view, None))
}

pub async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartView>> {
    let (product_id, quantity) = payload.validate()?;
    let product = active_product(state, product_id).await?;
    if quantity > product.stock {
        return Err(AppError::InsufficientStock(format!(
            "Only {} of {} left in stock",
            product.stock, product.name
        )));
    }

    let cart_id = ensure_cart(&state.pool, user.user_id).await?;

    // Merges into an existing line; the WHERE keeps the merged quantity within stock.
    let merged: Option<i32> = sqlx::query_scalar(
        r#"
        INSERT INTO cart_items (id, cart_id, product_id, quantity)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (cart_id, product_id) DO UPDATE
            SET quantity = cart_items.quantity + EXCLUDED.quantity
            WHERE cart_items.quantity + EXCLUDED.quantity
                <= (SELECT stock FROM products WHERE id = $3)
        RETURNING quantity
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(cart_id)
    .bind(product_id)
    .bind(quantity)
    .fetch_optional(&state.pool)
    .await?;

    let Some(merged) = merged else {
        return Err(AppError::InsufficientStock(format!(
            "Only {} of {} left in stock",
            product.stock, product.name
        )));
    };

    tracing::debug!(user_id = %user.user_id, %product_id, quantity = merged, "cart line updated");

    audit::record(
        &state.pool,
        user.user_id,
        "cart_add",
        "cart_items",
        serde_json::json!({ "product_id": product_id, "quantity": merged }),
    )
    .await;

    let view = cart_view(&state.orm, cart_id).await?;
    Ok(ApiResponse::success("Item added to cart successfully", view, None))
}

pub async fn update_cart_item(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateCartRequest,
) -> AppResult<ApiResponse<CartView>> {
    let (product_id, quantity) = payload.validate()?;
    let cart = find_cart(&state.orm, user.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Cart"))?;

    let product = active_product(state, product_id).await?;
    if quantity > product.stock {
        return Err(AppError::InsufficientStock(format!(
            "Only {} of {} left in stock",
            product.stock, product.name
        )));
    }

    let result = CartItems::update_many()
        .col_expr(ItemCol::Quantity, Expr::value(quantity))
        .filter(ItemCol::CartId.eq(cart.id))
        .filter(ItemCol::ProductId.eq(product_id))
        .exec(&state.orm)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Item not found in cart".into()));
    }

    audit::record(
        &state.pool,
        user.user_id,
        "cart_update",
        "cart_items",
        serde_json::json!({ "product_id": product_id, "quantity": quantity }),
    )
    .await;

    let view = cart_view(&state.orm, cart.id).await?;
    Ok(ApiResponse::success("Cart updated successfully", view, None))
}

/// Removing a product that is not in the cart succeeds.
pub async fn remove_from_cart(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<Empty>> {
    let cart = find_cart(&state.orm, user.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Cart"))?;

    CartItems::delete_many()
        .filter(ItemCol::CartId.eq(cart.id))
        .filter(ItemCol::ProductId.eq(product_id))
        .exec(&state.orm)
        .await?;

    audit::record(
        &state.pool,
        user.user_id,
        "cart_remove",
        "cart_items",
        serde_json::json!({ "product_id": product_id }),
    )
    .await;

    Ok(ApiResponse::message("Item removed from cart successfully"))
}
