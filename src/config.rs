use std::env;

use anyhow::Context;

use crate::domain::order_status::TransitionPolicy;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub transition_policy: TransitionPolicy,
    pub estimated_delivery_days: i64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET is not set")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let transition_policy = match env::var("ORDER_TRANSITION_POLICY") {
            Ok(raw) => raw.parse::<TransitionPolicy>()?,
            Err(_) => TransitionPolicy::default(),
        };
        let estimated_delivery_days =
            parse_delivery_days(env::var("ESTIMATED_DELIVERY_DAYS").ok().as_deref());
        Ok(Self {
            port,
            database_url,
            host,
            jwt_secret,
            transition_policy,
            estimated_delivery_days,
        })
    }
}

pub const DEFAULT_DELIVERY_DAYS: i64 = 7;
pub const MAX_DELIVERY_DAYS: i64 = 365;

/// Unset, unparsable or out-of-range values fall back to the default.
pub fn parse_delivery_days(raw: Option<&str>) -> i64 {
    raw.and_then(|d| d.trim().parse::<i64>().ok())
        .filter(|d| (0..=MAX_DELIVERY_DAYS).contains(d))
        .unwrap_or(DEFAULT_DELIVERY_DAYS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivery_days_accepts_values_in_range() {
        assert_eq!(parse_delivery_days(Some("0")), 0);
        assert_eq!(parse_delivery_days(Some(" 14 ")), 14);
        assert_eq!(parse_delivery_days(Some("365")), MAX_DELIVERY_DAYS);
    }

    #[test]
    fn delivery_days_falls_back_on_bad_input() {
        assert_eq!(parse_delivery_days(None), DEFAULT_DELIVERY_DAYS);
        assert_eq!(parse_delivery_days(Some("-1")), DEFAULT_DELIVERY_DAYS);
        assert_eq!(parse_delivery_days(Some("366")), DEFAULT_DELIVERY_DAYS);
        assert_eq!(parse_delivery_days(Some("9223372036854775807")), DEFAULT_DELIVERY_DAYS);
        assert_eq!(parse_delivery_days(Some("soon")), DEFAULT_DELIVERY_DAYS);
    }
}
