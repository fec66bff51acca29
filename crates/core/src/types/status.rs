//! Status enums for order lifecycle.

use serde::{Deserialize, Serialize};

/// Order payment status.
///
/// Orders are created by the Stripe webhook with status `paid` and this
/// system never transitions them further - fulfillment lives outside this
/// codebase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Paid,
    Refunded,
    Cancelled,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Paid => write!(f, "paid"),
            Self::Refunded => write!(f, "refunded"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "paid" => Ok(Self::Paid),
            "refunded" => Ok(Self::Refunded),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_serde_snake_case() {
        let json = serde_json::to_string(&OrderStatus::Paid).expect("serialize");
        assert_eq!(json, "\"paid\"");
    }

    #[test]
    fn test_order_status_round_trip() {
        let status: OrderStatus = "paid".parse().expect("parse");
        assert_eq!(status, OrderStatus::Paid);
        assert!("shipped".parse::<OrderStatus>().is_err());
    }
}
