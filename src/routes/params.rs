use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    domain::order_status::OrderStatus,
    dto::non_blank,
    error::{AppError, AppResult},
};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1).saturating_mul(per_page);
        (page, per_page, offset)
    }
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProductSortBy {
    CreatedAt,
    Price,
    Name,
}

// Query structs repeat the paging fields instead of flattening `Pagination`:
// flattened numbers do not deserialize from query strings.

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ProductQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub q: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub sort_by: Option<ProductSortBy>,
    pub sort_order: Option<SortOrder>,
}

impl ProductQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct OrderListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub status: Option<String>,
    pub sort_order: Option<SortOrder>,
}

impl OrderListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }

    pub fn status_filter(&self) -> AppResult<Option<OrderStatus>> {
        non_blank(self.status.clone())
            .map(|s| {
                s.parse::<OrderStatus>()
                    .map_err(|_| AppError::InvalidArgument("Invalid status".into()))
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_is_clamped() {
        let p = Pagination {
            page: Some(0),
            per_page: Some(500),
        };
        assert_eq!(p.normalize(), (1, 100, 0));
        let p = Pagination {
            page: Some(3),
            per_page: None,
        };
        assert_eq!(p.normalize(), (3, 20, 40));
    }

    #[test]
    fn huge_page_saturates_the_offset() {
        let p = Pagination {
            page: Some(i64::MAX),
            per_page: Some(100),
        };
        assert_eq!(p.normalize(), (i64::MAX, 100, i64::MAX));
        let p = Pagination {
            page: Some(i64::MIN),
            per_page: Some(i64::MIN),
        };
        assert_eq!(p.normalize(), (1, 1, 0));
    }

    #[test]
    fn status_filter_parses_or_rejects() {
        let q = OrderListQuery {
            status: Some("shipped".into()),
            ..Default::default()
        };
        assert_eq!(q.status_filter().unwrap(), Some(OrderStatus::Shipped));
        let q = OrderListQuery {
            status: Some("".into()),
            ..Default::default()
        };
        assert_eq!(q.status_filter().unwrap(), None);
        let q = OrderListQuery {
            status: Some("paid".into()),
            ..Default::default()
        };
        assert!(q.status_filter().is_err());
    }
}
