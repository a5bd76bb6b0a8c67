//! Dashboard stats computed client-side from the fetched order list.
//!
//! The dashboard shows these next to the order list it is already polling,
//! so they are derived locally instead of asking the backend again.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use stonefire_core::OrderStatus;
use stonefire_storefront::api::normalize::OrderSummary;

/// Headline numbers for the store dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardStats {
    /// Orders created since midnight (UTC) of the reference time.
    pub total_today: usize,
    /// Order counts per status. Every status is present, zero or not.
    pub by_status: BTreeMap<OrderStatus, usize>,
}

impl DashboardStats {
    /// Compute stats from an order list. `now` anchors the "today" window;
    /// orders without a parseable timestamp are excluded from it.
    #[must_use]
    pub fn from_orders(orders: &[OrderSummary], now: DateTime<Utc>) -> Self {
        let today = now.date_naive();
        let total_today = orders
            .iter()
            .filter_map(OrderSummary::created_at)
            .filter(|created| created.date_naive() == today)
            .count();

        let mut by_status: BTreeMap<OrderStatus, usize> =
            OrderStatus::all().into_iter().map(|s| (s, 0)).collect();
        for order in orders {
            if let Some(status) = order.status() {
                *by_status.entry(status).or_insert(0) += 1;
            }
        }

        Self {
            total_today,
            by_status,
        }
    }

    /// Count for one status.
    #[must_use]
    pub fn count(&self, status: OrderStatus) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }

    /// Orders currently waiting on the store.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.count(OrderStatus::Pending)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use stonefire_storefront::api::normalize::orders_from_value;

    #[test]
    fn test_counts_by_status_and_today() {
        let now = DateTime::parse_from_rfc3339("2026-08-05T14:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let orders = orders_from_value(&json!([
            {"id": 1, "status": "PENDING", "created_at": "2026-08-05T09:00:00"},
            {"id": 2, "status": "PENDING", "created_at": "2026-08-04T23:59:00"},
            {"id": 3, "status": "ACCEPTED", "created_at": "2026-08-05T13:30:00"},
            {"id": 4, "status": "REJECTED"},
            {"id": 5, "status": "something else", "created_at": "2026-08-05T10:00:00"}
        ]));

        let stats = DashboardStats::from_orders(&orders, now);
        assert_eq!(stats.total_today, 3);
        assert_eq!(stats.pending(), 2);
        assert_eq!(stats.count(OrderStatus::Accepted), 1);
        assert_eq!(stats.count(OrderStatus::Rejected), 1);
        assert_eq!(stats.count(OrderStatus::Delivered), 0);
    }

    #[test]
    fn test_empty_order_list() {
        let stats = DashboardStats::from_orders(&[], Utc::now());
        assert_eq!(stats.total_today, 0);
        assert_eq!(stats.pending(), 0);
        // Every status is represented even when zero
        assert_eq!(stats.by_status.len(), OrderStatus::all().len());
    }
}
