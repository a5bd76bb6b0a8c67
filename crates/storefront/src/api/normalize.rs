//! Boundary adapter for order-list responses.
//!
//! Backend deployments have answered `GET /orders` with a bare JSON array,
//! or with the list wrapped under `orders`, `data`, `results`, or `list`.
//! Individual orders are similarly loose about status and timestamp field
//! names. All of that shape-shifting is normalized here, once, instead of
//! scattered through every caller.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use stonefire_core::{OrderId, OrderStatus, Price};

/// Wrapper keys checked, in priority order, when the order list is not a
/// bare array.
const WRAPPER_KEYS: [&str; 4] = ["orders", "data", "results", "list"];

/// One order as reported by the backend, with tolerant field names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSummary {
    pub id: OrderId,
    /// Raw status text; use [`OrderSummary::status`] for the parsed enum.
    #[serde(
        default,
        alias = "order_status",
        alias = "state",
        alias = "order_state"
    )]
    pub status: Option<String>,
    #[serde(default)]
    pub total: Option<Price>,
    /// Raw creation timestamp; use [`OrderSummary::created_at`] to parse.
    #[serde(
        default,
        alias = "createdAt",
        alias = "date",
        alias = "order_date",
        alias = "order_time",
        alias = "ordered_at",
        alias = "placed_at",
        alias = "timestamp"
    )]
    pub created_at: Option<Value>,
    #[serde(default)]
    pub items: Vec<OrderItemSummary>,
    #[serde(default)]
    pub location: Option<Value>,
    /// Everything else the backend attached (delivery fields, payment state).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// One snapshotted line within an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemSummary {
    #[serde(default, alias = "name", alias = "title")]
    pub product_name: Option<String>,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub unit_price: Option<Price>,
}

const fn default_quantity() -> u32 {
    1
}

impl OrderSummary {
    /// The parsed order status, if the raw text is recognizable.
    #[must_use]
    pub fn status(&self) -> Option<OrderStatus> {
        self.status.as_deref()?.parse().ok()
    }

    /// Whether this order is waiting on the store.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status() == Some(OrderStatus::Pending)
    }

    /// The creation time, parsed from whatever the backend sent: epoch
    /// seconds, epoch milliseconds, or an ISO 8601 string with or without a
    /// timezone.
    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(self.created_at.as_ref()?)
    }
}

/// Normalize an order-list response into a list of orders.
///
/// Accepts a bare array or an object wrapping the array under one of the
/// known keys (first match wins). Entries that do not look like orders are
/// skipped with a warning rather than failing the whole poll.
#[must_use]
pub fn orders_from_value(value: &Value) -> Vec<OrderSummary> {
    let entries = match value {
        Value::Array(entries) => entries.as_slice(),
        Value::Object(map) => WRAPPER_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_array))
            .map_or(&[][..], Vec::as_slice),
        _ => &[],
    };

    entries
        .iter()
        .filter_map(|entry| match serde_json::from_value(entry.clone()) {
            Ok(order) => Some(order),
            Err(e) => {
                tracing::warn!(error = %e, "skipping malformed order entry");
                None
            }
        })
        .collect()
}

/// Count of orders currently in `PENDING`.
#[must_use]
pub fn pending_count(orders: &[OrderSummary]) -> usize {
    orders.iter().filter(|order| order.is_pending()).count()
}

/// Epoch values below this are seconds; at or above, milliseconds.
const EPOCH_MILLIS_CUTOFF: i64 = 1_000_000_000_000;

fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => {
            let raw = n.as_i64()?;
            if raw < EPOCH_MILLIS_CUTOFF {
                DateTime::from_timestamp(raw, 0)
            } else {
                DateTime::from_timestamp_millis(raw)
            }
        }
        Value::String(s) => {
            if let Ok(with_tz) = DateTime::parse_from_rfc3339(s) {
                return Some(with_tz.with_timezone(&Utc));
            }
            // Backend timestamps are often naive ISO; treat them as UTC.
            for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
                if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
                    return Some(naive.and_utc());
                }
            }
            None
        }
        _ => None,
    }
}
