use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dto::non_blank,
    error::{AppError, AppResult},
    models::Product,
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    /// Cents.
    pub price: Option<i64>,
    pub stock: Option<i32>,
    pub is_active: Option<bool>,
}

pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub category: String,
    pub image_url: Option<String>,
    pub price: i64,
    pub stock: i32,
    pub is_active: bool,
}

impl CreateProductRequest {
    pub fn validate(self) -> AppResult<NewProduct> {
        let (Some(name), Some(description), Some(category), Some(price), Some(stock)) = (
            non_blank(self.name),
            non_blank(self.description),
            non_blank(self.category),
            self.price,
            self.stock,
        ) else {
            return Err(AppError::InvalidArgument("All fields are required".into()));
        };
        check_amounts(Some(price), Some(stock))?;
        Ok(NewProduct {
            name,
            description,
            category,
            image_url: non_blank(self.image_url),
            price,
            stock,
            is_active: self.is_active.unwrap_or(true),
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub price: Option<i64>,
    pub stock: Option<i32>,
    pub is_active: Option<bool>,
}

impl UpdateProductRequest {
    pub fn validate(&self) -> AppResult<()> {
        check_amounts(self.price, self.stock)
    }
}

fn check_amounts(price: Option<i64>, stock: Option<i32>) -> AppResult<()> {
    if price.is_some_and(|p| p < 0) {
        return Err(AppError::InvalidArgument("price must not be negative".into()));
    }
    if stock.is_some_and(|s| s < 0) {
        return Err(AppError::InvalidArgument("stock must not be negative".into()));
    }
    Ok(())
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedId {
    pub id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateProductRequest {
        CreateProductRequest {
            name: Some("Whey Isolate 2kg".into()),
            description: Some("Unflavoured".into()),
            category: Some("protein".into()),
            image_url: None,
            price: Some(5999),
            stock: Some(40),
            is_active: None,
        }
    }

    #[test]
    fn new_products_default_to_active() {
        let product = request().validate().unwrap();
        assert!(product.is_active);
        assert_eq!(product.price, 5999);
    }

    #[test]
    fn rejects_missing_fields_and_negative_amounts() {
        let mut req = request();
        req.category = Some(" ".into());
        assert!(req.validate().is_err());

        let mut req = request();
        req.stock = Some(-1);
        assert!(req.validate().is_err());
    }
}
