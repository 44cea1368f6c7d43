use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    domain::order_status::OrderStatus,
    models::{Order, OrderItem},
    routes::params::Pagination,
};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CustomerSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// Order joined with its customer and item snapshot.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub user: Option<CustomerSummary>,
    /// Statuses the current transition policy would accept next.
    pub next_statuses: Vec<OrderStatus>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderDetailList {
    pub items: Vec<OrderDetail>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_products: i64,
    pub total_users: i64,
    pub total_orders: i64,
    pub total_revenue: i64,
    pub recent_orders: i64,
    pub active_coupons: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CouponStats {
    pub id: Uuid,
    pub code: String,
    pub influencer_name: String,
    pub discount: i32,
    pub is_active: bool,
    /// Counter maintained at checkout.
    pub usage_count: i64,
    /// Orders that carry this code.
    pub order_count: i64,
    pub total_sales: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct CouponStatsList {
    #[schema(value_type = Vec<CouponStats>)]
    pub items: Vec<CouponStats>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct LowStockQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    /// Defaults to 5.
    pub threshold: Option<i32>,
}

impl LowStockQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}
