//! Cancellable order-status polling.
//!
//! A poll session re-fetches the customer's orders every 5 seconds, emits
//! each result (or error) to the owning view's channel, and fires a
//! notification side effect when an order's status changed since the
//! previous poll. An unauthorized response terminates the session - the
//! API client's global hook has already signed the customer out by the time
//! the terminal event is emitted.
//!
//! The task is tied to its [`OrderWatch`]: starting a new cycle fully
//! cancels the prior one first, `stop` is idempotent, and dropping the
//! watch cancels the task.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use stonefire_core::{OrderId, OrderStatus};

use crate::api::ApiClient;
use crate::api::ApiError;
use crate::api::normalize::OrderSummary;

/// How often a poll session re-fetches.
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Side-effect hook for "something needs attention" notifications.
///
/// Implementations must be fire-and-forget: never block, and swallow their
/// own playback failures.
pub trait NotificationSink: Send + Sync {
    fn notify(&self);
}

/// A sink that does nothing.
pub struct SilentSink;

impl NotificationSink for SilentSink {
    fn notify(&self) {}
}

/// What a poll session reports to its owning view.
#[derive(Debug)]
pub enum PollEvent {
    /// A successful fetch; the full normalized order list.
    Orders(Vec<OrderSummary>),
    /// A non-terminal error; polling continues.
    Error(String),
    /// The session was rejected; polling has terminated.
    SessionExpired,
}

/// Owner of one polling task.
#[derive(Default)]
pub struct OrderWatch {
    cancel: Option<watch::Sender<bool>>,
    task: Option<JoinHandle<()>>,
}

impl OrderWatch {
    /// Create an idle watch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start polling at the default 5-second interval. Any prior cycle is
    /// fully cancelled first.
    pub fn start(
        &mut self,
        api: ApiClient,
        events: mpsc::UnboundedSender<PollEvent>,
        sink: Arc<dyn NotificationSink>,
    ) {
        self.start_with_interval(api, events, sink, POLL_INTERVAL);
    }

    /// Start polling at a custom interval.
    pub fn start_with_interval(
        &mut self,
        api: ApiClient,
        events: mpsc::UnboundedSender<PollEvent>,
        sink: Arc<dyn NotificationSink>,
        interval: Duration,
    ) {
        self.stop();
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let task = tokio::spawn(run(api, events, sink, cancel_rx, interval));
        self.cancel = Some(cancel_tx);
        self.task = Some(task);
    }

    /// Cancel the current cycle. Idempotent; stopping an idle watch is a
    /// no-op.
    pub fn stop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(true);
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// Whether a poll task is currently alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for OrderWatch {
    fn drop(&mut self) {
        self.stop();
    }
}

type StatusSnapshot = HashMap<OrderId, Option<OrderStatus>>;

async fn run(
    api: ApiClient,
    events: mpsc::UnboundedSender<PollEvent>,
    sink: Arc<dyn NotificationSink>,
    mut cancel: watch::Receiver<bool>,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut previous: Option<StatusSnapshot> = None;

    loop {
        tokio::select! {
            _ = cancel.changed() => break,
            _ = ticker.tick() => {}
        }

        let fetched = tokio::select! {
            _ = cancel.changed() => break,
            result = api.orders() => result,
        };

        match fetched {
            Ok(orders) => {
                let snapshot = snapshot(&orders);
                // Never on the first poll - there is nothing to compare to.
                if let Some(previous) = &previous
                    && statuses_changed(previous, &snapshot)
                {
                    sink.notify();
                }
                previous = Some(snapshot);
                if events.send(PollEvent::Orders(orders)).is_err() {
                    break;
                }
            }
            Err(ApiError::Unauthorized { .. }) => {
                let _ = events.send(PollEvent::SessionExpired);
                break;
            }
            Err(e) => {
                if events.send(PollEvent::Error(e.user_message())).is_err() {
                    break;
                }
            }
        }
    }
}

fn snapshot(orders: &[OrderSummary]) -> StatusSnapshot {
    orders
        .iter()
        .map(|order| (order.id, order.status()))
        .collect()
}

/// Whether any order seen in the previous poll has a different status now.
///
/// Orders appearing or disappearing between polls do not count; only a
/// status transition on a known order id does.
fn statuses_changed(previous: &StatusSnapshot, current: &StatusSnapshot) -> bool {
    current.iter().any(|(id, status)| {
        previous
            .get(id)
            .is_some_and(|previous_status| previous_status != status)
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn snap(entries: &[(i64, Option<OrderStatus>)]) -> StatusSnapshot {
        entries
            .iter()
            .map(|(id, status)| (OrderId::new(*id), *status))
            .collect()
    }

    #[test]
    fn test_no_change_no_notification() {
        let previous = snap(&[(1, Some(OrderStatus::Pending))]);
        let current = snap(&[(1, Some(OrderStatus::Pending))]);
        assert!(!statuses_changed(&previous, &current));
    }

    #[test]
    fn test_status_transition_detected() {
        let previous = snap(&[(1, Some(OrderStatus::Pending))]);
        let current = snap(&[(1, Some(OrderStatus::Accepted))]);
        assert!(statuses_changed(&previous, &current));
    }

    #[test]
    fn test_new_order_alone_is_not_a_change() {
        let previous = snap(&[(1, Some(OrderStatus::Pending))]);
        let current = snap(&[
            (1, Some(OrderStatus::Pending)),
            (2, Some(OrderStatus::Pending)),
        ]);
        assert!(!statuses_changed(&previous, &current));
    }

    #[test]
    fn test_unparsable_to_known_status_counts() {
        let previous = snap(&[(1, None)]);
        let current = snap(&[(1, Some(OrderStatus::Ready))]);
        assert!(statuses_changed(&previous, &current));
    }

    #[tokio::test]
    async fn test_stop_is_idempotent_on_idle_watch() {
        let mut watch = OrderWatch::new();
        assert!(!watch.is_running());
        watch.stop();
        watch.stop();
        assert!(!watch.is_running());
    }
}
