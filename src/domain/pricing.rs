//! Amounts are integer minor units (cents).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTotals {
    pub subtotal: i64,
    pub discount: i64,
    pub total: i64,
}

pub fn line_total(unit_price: i64, quantity: i32) -> i64 {
    unit_price * i64::from(quantity)
}

pub fn subtotal<I>(lines: I) -> i64
where
    I: IntoIterator<Item = (i64, i32)>,
{
    lines
        .into_iter()
        .map(|(price, quantity)| line_total(price, quantity))
        .sum()
}

/// `subtotal * percent / 100`, rounded half up to the cent.
pub fn discount_amount(subtotal: i64, percent: i32) -> i64 {
    let percent = i128::from(percent.clamp(0, 100));
    ((i128::from(subtotal) * percent + 50) / 100) as i64
}

pub fn order_totals(subtotal: i64, discount_percent: Option<i32>) -> OrderTotals {
    let discount = discount_percent
        .map(|pct| discount_amount(subtotal, pct))
        .unwrap_or(0);
    OrderTotals {
        subtotal,
        discount,
        total: subtotal - discount,
    }
}

/// Coupon codes are stored upper-cased and compared that way.
pub fn normalize_coupon_code(code: &str) -> String {
    code.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twenty_percent_off_mixed_cart() {
        let sub = subtotal([(1000, 2), (500, 1)]);
        assert_eq!(sub, 2500);
        let totals = order_totals(sub, Some(20));
        assert_eq!(
            totals,
            OrderTotals {
                subtotal: 2500,
                discount: 500,
                total: 2000
            }
        );
        assert_eq!(totals.total + totals.discount, totals.subtotal);
    }

    #[test]
    fn discount_rounds_half_up_to_the_cent() {
        // 15% of 9.99 = 1.4985
        assert_eq!(discount_amount(999, 15), 150);
        // 10% of 0.05 = 0.005
        assert_eq!(discount_amount(5, 10), 1);
        // 10% of 0.04 = 0.004
        assert_eq!(discount_amount(4, 10), 0);
    }

    #[test]
    fn full_discount_is_a_free_order() {
        let totals = order_totals(4599, Some(100));
        assert_eq!(totals.discount, 4599);
        assert_eq!(totals.total, 0);
    }

    #[test]
    fn no_coupon_means_no_discount() {
        assert_eq!(order_totals(1234, None).total, 1234);
    }

    #[test]
    fn codes_normalize_to_upper_case() {
        assert_eq!(normalize_coupon_code(" save20 "), "SAVE20");
        assert_eq!(normalize_coupon_code("Save20"), normalize_coupon_code("SAVE20"));
    }
}
