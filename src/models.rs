use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    domain::{order_status::OrderStatus, pricing::line_total},
    entity::{coupons, order_items, orders, products, tracking_events, users},
    error::AppError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
    Delivery,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::Delivery => "delivery",
        }
    }

    /// Admin and delivery staff see every order.
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Delivery)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            "delivery" => Ok(Role::Delivery),
            other => Err(AppError::Internal(anyhow::anyhow!("unknown role `{other}`"))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub image_url: Option<String>,
    /// Cents.
    pub price: i64,
    pub stock: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub id: Uuid,
    pub code: String,
    /// Percent, 1 to 100.
    pub discount: i32,
    pub influencer_name: String,
    pub is_active: bool,
    pub usage_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub subtotal_amount: i64,
    pub discount_amount: i64,
    pub total_amount: i64,
    pub coupon_code: Option<String>,
    pub status: OrderStatus,
    pub shipping_address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product details as they were when the order was placed.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub product_category: String,
    pub product_image_url: Option<String>,
    pub unit_price: i64,
    pub quantity: i32,
    pub line_total: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrackingEvent {
    pub id: Uuid,
    pub sequence: i64,
    pub order_id: Uuid,
    pub status: OrderStatus,
    pub message: String,
    pub location: Option<String>,
    pub updated_by_id: Option<Uuid>,
    pub updated_by: String,
    /// `system`, `admin` or `delivery`.
    pub updated_by_role: String,
    pub timestamp: DateTime<Utc>,
}

pub(crate) fn parse_status(raw: &str) -> Result<OrderStatus, AppError> {
    raw.parse::<OrderStatus>()
        .map_err(|err| AppError::Internal(anyhow::Error::new(err)))
}

impl TryFrom<users::Model> for User {
    type Error = AppError;

    fn try_from(model: users::Model) -> Result<Self, Self::Error> {
        Ok(User {
            id: model.id,
            email: model.email,
            name: model.name,
            role: model.role.parse()?,
            phone: model.phone,
            address: model.address,
            created_at: model.created_at.with_timezone(&Utc),
        })
    }
}

impl From<products::Model> for Product {
    fn from(model: products::Model) -> Self {
        Product {
            id: model.id,
            name: model.name,
            description: model.description,
            category: model.category,
            image_url: model.image_url,
            price: model.price,
            stock: model.stock,
            is_active: model.is_active,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<coupons::Model> for Coupon {
    fn from(model: coupons::Model) -> Self {
        Coupon {
            id: model.id,
            code: model.code,
            discount: model.discount,
            influencer_name: model.influencer_name,
            is_active: model.is_active,
            usage_count: model.usage_count,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl TryFrom<orders::Model> for Order {
    type Error = AppError;

    fn try_from(model: orders::Model) -> Result<Self, Self::Error> {
        Ok(Order {
            id: model.id,
            user_id: model.user_id,
            subtotal_amount: model.subtotal_amount,
            discount_amount: model.discount_amount,
            total_amount: model.total_amount,
            coupon_code: model.coupon_code,
            status: parse_status(&model.status)?,
            shipping_address: model.shipping_address,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        })
    }
}

impl From<order_items::Model> for OrderItem {
    fn from(model: order_items::Model) -> Self {
        OrderItem {
            id: model.id,
            order_id: model.order_id,
            product_id: model.product_id,
            product_name: model.product_name,
            product_category: model.product_category,
            product_image_url: model.product_image_url,
            unit_price: model.unit_price,
            quantity: model.quantity,
            line_total: line_total(model.unit_price, model.quantity),
        }
    }
}

impl TryFrom<tracking_events::Model> for TrackingEvent {
    type Error = AppError;

    fn try_from(model: tracking_events::Model) -> Result<Self, Self::Error> {
        Ok(TrackingEvent {
            id: model.id,
            sequence: model.seq,
            order_id: model.order_id,
            status: parse_status(&model.status)?,
            message: model.message,
            location: model.location,
            updated_by_id: model.updated_by_id,
            updated_by: model.updated_by_name,
            updated_by_role: model.updated_by_role,
            timestamp: model.occurred_at.with_timezone(&Utc),
        })
    }
}
