//! Status enums for orders, payments, and admin roles.

use serde::{Deserialize, Serialize};

/// Order lifecycle status.
///
/// Created as `Pending` at checkout; mutated only by admin actions.
/// `Delivered` and `Rejected` are terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Accepted,
    Preparing,
    Ready,
    OutForDelivery,
    Delivered,
    Rejected,
}

impl OrderStatus {
    /// Terminal statuses cannot be changed by further admin actions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Rejected)
    }

    /// All statuses in lifecycle order. Used by dashboards for filters and
    /// per-status counts.
    #[must_use]
    pub const fn all() -> [Self; 7] {
        [
            Self::Pending,
            Self::Accepted,
            Self::Preparing,
            Self::Ready,
            Self::OutForDelivery,
            Self::Delivered,
            Self::Rejected,
        ]
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Accepted => "ACCEPTED",
            Self::Preparing => "PREPARING",
            Self::Ready => "READY",
            Self::OutForDelivery => "OUT_FOR_DELIVERY",
            Self::Delivered => "DELIVERED",
            Self::Rejected => "REJECTED",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    /// Case-insensitive parse; the backend is not consistent about casing.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "ACCEPTED" => Ok(Self::Accepted),
            "PREPARING" => Ok(Self::Preparing),
            "READY" => Ok(Self::Ready),
            "OUT_FOR_DELIVERY" => Ok(Self::OutForDelivery),
            "DELIVERED" => Ok(Self::Delivered),
            "REJECTED" => Ok(Self::Rejected),
            other => Err(format!("invalid order status: {other}")),
        }
    }
}

/// Payment method chosen at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Card,
    Cash,
}

/// Payment state of an order, as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
}

/// Admin role with different permission levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    /// Full access across all stores, including admin management.
    SuperAdmin,
    /// Access scoped to a single store.
    StoreAdmin,
}

impl std::fmt::Display for AdminRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SuperAdmin => write!(f, "super_admin"),
            Self::StoreAdmin => write!(f, "store_admin"),
        }
    }
}

impl std::str::FromStr for AdminRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super_admin" => Ok(Self::SuperAdmin),
            "store_admin" => Ok(Self::StoreAdmin),
            _ => Err(format!("invalid admin role: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serde_screaming_snake() {
        let status: OrderStatus = serde_json::from_str("\"OUT_FOR_DELIVERY\"").unwrap();
        assert_eq!(status, OrderStatus::OutForDelivery);
        assert_eq!(
            serde_json::to_string(&OrderStatus::Preparing).unwrap(),
            "\"PREPARING\""
        );
    }

    #[test]
    fn test_status_parse_is_case_insensitive() {
        assert_eq!(
            "pending".parse::<OrderStatus>().unwrap(),
            OrderStatus::Pending
        );
        assert_eq!(
            " Delivered ".parse::<OrderStatus>().unwrap(),
            OrderStatus::Delivered
        );
        assert!("CONFIRMED?".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Rejected.is_terminal());
        assert!(!OrderStatus::OutForDelivery.is_terminal());
    }

    #[test]
    fn test_payment_method_lowercase() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::Cash).unwrap(),
            "\"cash\""
        );
    }

    #[test]
    fn test_admin_role_roundtrip() {
        let role: AdminRole = "store_admin".parse().unwrap();
        assert_eq!(role.to_string(), "store_admin");
    }
}
