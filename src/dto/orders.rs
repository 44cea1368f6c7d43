use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    domain::{order_status::OrderStatus, pricing::normalize_coupon_code, tracking::clean_location},
    dto::non_blank,
    error::{AppError, AppResult},
    models::{Order, OrderItem, TrackingEvent},
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub shipping_address: Option<String>,
    pub coupon_code: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Checkout {
    pub shipping_address: String,
    /// Upper-cased.
    pub coupon_code: Option<String>,
}

impl PlaceOrderRequest {
    pub fn validate(self) -> AppResult<Checkout> {
        let shipping_address = non_blank(self.shipping_address)
            .ok_or_else(|| AppError::InvalidArgument("Shipping address is required".into()))?;
        Ok(Checkout {
            shipping_address,
            coupon_code: non_blank(self.coupon_code).map(|c| normalize_coupon_code(&c)),
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlacedOrder {
    pub order_id: Uuid,
    pub subtotal_amount: i64,
    pub discount_amount: i64,
    pub total_amount: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    pub status: Option<String>,
    pub message: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StatusChange {
    pub status: OrderStatus,
    pub message: String,
    pub location: Option<String>,
}

impl UpdateStatusRequest {
    pub fn validate(self) -> AppResult<StatusChange> {
        let (Some(status), Some(message)) = (non_blank(self.status), non_blank(self.message))
        else {
            return Err(AppError::InvalidArgument(
                "Status and message are required".into(),
            ));
        };
        let status = status
            .parse::<OrderStatus>()
            .map_err(|_| AppError::InvalidArgument("Invalid status".into()))?;
        Ok(StatusChange {
            status,
            message,
            location: clean_location(self.location),
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusUpdate {
    pub order: Order,
    pub event: TrackingEvent,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkout_requires_an_address() {
        let req = PlaceOrderRequest {
            shipping_address: Some("   ".into()),
            coupon_code: Some("save20".into()),
        };
        assert!(matches!(req.validate(), Err(AppError::InvalidArgument(_))));
    }

    #[test]
    fn checkout_normalizes_coupon() {
        let checkout = PlaceOrderRequest {
            shipping_address: Some("12 Iron St, Newark".into()),
            coupon_code: Some(" save20".into()),
        }
        .validate()
        .unwrap();
        assert_eq!(checkout.coupon_code.as_deref(), Some("SAVE20"));

        let checkout = PlaceOrderRequest {
            shipping_address: Some("12 Iron St, Newark".into()),
            coupon_code: Some("".into()),
        }
        .validate()
        .unwrap();
        assert_eq!(checkout.coupon_code, None);
    }

    #[test]
    fn status_update_needs_known_status_and_message() {
        let missing = UpdateStatusRequest {
            status: Some("shipped".into()),
            message: None,
            location: None,
        };
        assert!(matches!(
            missing.validate(),
            Err(AppError::InvalidArgument(msg)) if msg == "Status and message are required"
        ));

        let unknown = UpdateStatusRequest {
            status: Some("lost".into()),
            message: Some("?".into()),
            location: None,
        };
        assert!(matches!(
            unknown.validate(),
            Err(AppError::InvalidArgument(msg)) if msg == "Invalid status"
        ));

        let ok = UpdateStatusRequest {
            status: Some("shipped".into()),
            message: Some("On the way".into()),
            location: Some(" Newark Hub ".into()),
        }
        .validate()
        .unwrap();
        assert_eq!(ok.status, OrderStatus::Shipped);
        assert_eq!(ok.location.as_deref(), Some("Newark Hub"));
    }
}
