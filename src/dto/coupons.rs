use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    domain::pricing::normalize_coupon_code,
    dto::non_blank,
    error::{AppError, AppResult},
    models::Coupon,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct ValidateCouponRequest {
    pub code: Option<String>,
}

impl ValidateCouponRequest {
    pub fn validate(self) -> AppResult<String> {
        non_blank(self.code)
            .map(|c| normalize_coupon_code(&c))
            .ok_or_else(|| AppError::InvalidArgument("Coupon code is required".into()))
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CouponValidation {
    pub code: String,
    pub discount: i32,
    pub influencer_name: String,
}

/// Body for both create and update.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CouponRequest {
    pub code: Option<String>,
    pub discount: Option<i32>,
    pub influencer_name: Option<String>,
    pub is_active: Option<bool>,
}

pub struct CouponFields {
    pub code: String,
    pub discount: i32,
    pub influencer_name: String,
    pub is_active: bool,
}

impl CouponRequest {
    pub fn validate(self) -> AppResult<CouponFields> {
        let (Some(code), Some(discount), Some(influencer_name)) = (
            non_blank(self.code),
            self.discount,
            non_blank(self.influencer_name),
        ) else {
            return Err(AppError::InvalidArgument(
                "Code, discount, and influencer name are required".into(),
            ));
        };
        if !(1..=100).contains(&discount) {
            return Err(AppError::InvalidArgument(
                "discount must be between 1 and 100".into(),
            ));
        }
        Ok(CouponFields {
            code: normalize_coupon_code(&code),
            discount,
            influencer_name,
            is_active: self.is_active.unwrap_or(true),
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct CouponList {
    #[schema(value_type = Vec<Coupon>)]
    pub items: Vec<Coupon>,
}
