use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::Product,
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: Option<Uuid>,
    /// Defaults to 1.
    pub quantity: Option<i32>,
}

impl AddToCartRequest {
    pub fn validate(self) -> AppResult<(Uuid, i32)> {
        let product_id = self
            .product_id
            .ok_or_else(|| AppError::InvalidArgument("Product ID is required".into()))?;
        let quantity = self.quantity.unwrap_or(1);
        if quantity < 1 {
            return Err(AppError::InvalidArgument(
                "quantity must be greater than 0".into(),
            ));
        }
        Ok((product_id, quantity))
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartRequest {
    pub product_id: Option<Uuid>,
    pub quantity: Option<i32>,
}

impl UpdateCartRequest {
    pub fn validate(self) -> AppResult<(Uuid, i32)> {
        match (self.product_id, self.quantity) {
            (Some(product_id), Some(quantity)) if quantity >= 1 => Ok((product_id, quantity)),
            _ => Err(AppError::InvalidArgument(
                "Product ID and valid quantity are required".into(),
            )),
        }
    }
}

/// Cart line joined with the live catalog row.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartItemDto {
    pub product_id: Uuid,
    pub quantity: i32,
    pub product: Product,
    pub line_total: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartView {
    pub items: Vec<CartItemDto>,
    pub subtotal: i64,
}

impl CartView {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            subtotal: 0,
        }
    }
}
