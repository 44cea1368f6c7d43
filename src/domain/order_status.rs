use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Successor on the happy path `pending -> processing -> shipped -> delivered`.
    pub fn next(&self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Pending => Some(OrderStatus::Processing),
            OrderStatus::Processing => Some(OrderStatus::Shipped),
            OrderStatus::Shipped => Some(OrderStatus::Delivered),
            OrderStatus::Delivered | OrderStatus::Cancelled => None,
        }
    }

    pub fn non_terminal() -> impl Iterator<Item = OrderStatus> {
        Self::ALL.into_iter().filter(|s| !s.is_terminal())
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown order status `{0}`")]
pub struct UnknownStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|s| s.as_str() == raw)
            .ok_or_else(|| UnknownStatus(raw.to_string()))
    }
}

/// How far an actor may move an order in one transition.
///
/// Both policies refuse to leave `delivered` or `cancelled`. `Permissive`
/// otherwise accepts any status; `Strict` accepts only a repeat of the
/// current status (a tracking note), the next happy-path status, or
/// `cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionPolicy {
    #[default]
    Permissive,
    Strict,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown transition policy `{0}`, expected `strict` or `permissive`")]
pub struct UnknownPolicy(pub String);

impl FromStr for TransitionPolicy {
    type Err = UnknownPolicy;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(TransitionPolicy::Strict),
            "permissive" => Ok(TransitionPolicy::Permissive),
            _ => Err(UnknownPolicy(raw.to_string())),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Order is already {0} and can no longer change status")]
    Terminal(OrderStatus),

    #[error("Cannot move order from {from} to {to}")]
    NotAllowed { from: OrderStatus, to: OrderStatus },
}

impl TransitionPolicy {
    pub fn check(self, from: OrderStatus, to: OrderStatus) -> Result<(), TransitionError> {
        if from.is_terminal() {
            return Err(TransitionError::Terminal(from));
        }
        match self {
            TransitionPolicy::Permissive => Ok(()),
            TransitionPolicy::Strict => {
                if to == from || to == OrderStatus::Cancelled || from.next() == Some(to) {
                    Ok(())
                } else {
                    Err(TransitionError::NotAllowed { from, to })
                }
            }
        }
    }

    /// Statuses reachable from `from`, in enum order.
    pub fn allowed_targets(self, from: OrderStatus) -> Vec<OrderStatus> {
        OrderStatus::ALL
            .into_iter()
            .filter(|to| self.check(from, *to).is_ok())
            .collect()
    }
}
