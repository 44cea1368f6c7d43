use utoipa::{
    Modify, OpenApi,
    openapi::{
        self, OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    domain::{order_status::OrderStatus, tracking::DeliveryAgent},
    dto::{
        admin::{
            CouponStats, CouponStatsList, CustomerSummary, DashboardStats, LowStockQuery,
            OrderDetail, OrderDetailList,
        },
        auth::{AuthPayload, LoginRequest, RegisterRequest},
        cart::{AddToCartRequest, CartItemDto, CartView, UpdateCartRequest},
        coupons::{CouponList, CouponRequest, CouponValidation, ValidateCouponRequest},
        orders::{
            OrderList, OrderWithItems, PlaceOrderRequest, PlacedOrder, StatusUpdate,
            UpdateStatusRequest,
        },
        products::{CreateProductRequest, CreatedId, ProductList, UpdateProductRequest},
        profile::UpdateProfileRequest,
        tracking::TrackingView,
    },
    models::{Coupon, Order, OrderItem, Product, Role, TrackingEvent, User},
    response::{ApiResponse, Empty, Meta},
    routes::{admin, auth, cart, coupons, health, orders, params, products},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::get_profile,
        auth::update_profile,
        products::list_products,
        products::get_product,
        cart::get_cart,
        cart::add_to_cart,
        cart::update_cart_item,
        cart::remove_from_cart,
        coupons::validate_coupon,
        orders::list_orders,
        orders::place_order,
        orders::get_order,
        orders::get_tracking,
        orders::update_status,
        orders::delivery_queue,
        admin::create_product,
        admin::update_product,
        admin::delete_product,
        admin::list_low_stock,
        admin::list_all_orders,
        admin::dashboard_stats,
        admin::coupon_stats,
        admin::list_coupons,
        admin::create_coupon,
        admin::update_coupon,
        admin::delete_coupon,
    ),
    components(
        schemas(
            User,
            Role,
            Product,
            Coupon,
            Order,
            OrderItem,
            OrderStatus,
            TrackingEvent,
            DeliveryAgent,
            RegisterRequest,
            LoginRequest,
            AuthPayload,
            UpdateProfileRequest,
            CreateProductRequest,
            UpdateProductRequest,
            CreatedId,
            ProductList,
            AddToCartRequest,
            UpdateCartRequest,
            CartItemDto,
            CartView,
            ValidateCouponRequest,
            CouponValidation,
            CouponRequest,
            CouponList,
            PlaceOrderRequest,
            PlacedOrder,
            UpdateStatusRequest,
            StatusUpdate,
            OrderList,
            OrderWithItems,
            TrackingView,
            CustomerSummary,
            OrderDetail,
            OrderDetailList,
            DashboardStats,
            CouponStats,
            CouponStatsList,
            LowStockQuery,
            params::Pagination,
            params::ProductQuery,
            params::OrderListQuery,
            Meta,
            Empty,
            ApiResponse<OrderWithItems>,
            ApiResponse<TrackingView>,
            ApiResponse<StatusUpdate>,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration, login and profile"),
        (name = "Products", description = "Public catalog"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Coupons", description = "Coupon validation"),
        (name = "Orders", description = "Orders, tracking and status updates"),
        (name = "Delivery", description = "Delivery queue"),
        (name = "Admin", description = "Catalog, coupon and order administration"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
