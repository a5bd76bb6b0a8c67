//! Pending-order polling for the admin dashboard.
//!
//! Same cancellable 5-second cycle as the customer poller, but the
//! notification rule is aggregate: the sink fires only when the PENDING
//! count both was already nonzero on the previous poll AND increased. The
//! first poll never notifies (the previous count starts at zero), and a
//! dashboard that starts out with pending orders does not ring for them.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use stonefire_core::StoreId;
use stonefire_storefront::api::normalize::{orders_from_value, pending_count};
use stonefire_storefront::api::{ApiClient, ApiError};
use stonefire_storefront::poller::{NotificationSink, POLL_INTERVAL, PollEvent};

use crate::client::orders_path;

/// Whether a new-pending-order notification should fire.
///
/// Two-part rule: the previous poll must already have seen pending orders,
/// AND the count must have increased. A plain "any increase" would ring on
/// the first poll after opening the dashboard; this rule never does.
#[must_use]
pub const fn should_notify(previous_pending: usize, current_pending: usize) -> bool {
    previous_pending > 0 && current_pending > previous_pending
}

/// Owner of one admin polling task.
#[derive(Default)]
pub struct PendingWatch {
    cancel: Option<watch::Sender<bool>>,
    task: Option<JoinHandle<()>>,
}

impl PendingWatch {
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
        store_id: Option<StoreId>,
        events: mpsc::UnboundedSender<PollEvent>,
        sink: Arc<dyn NotificationSink>,
    ) {
        self.start_with_interval(api, store_id, events, sink, POLL_INTERVAL);
    }

    /// Start polling at a custom interval.
    pub fn start_with_interval(
        &mut self,
        api: ApiClient,
        store_id: Option<StoreId>,
        events: mpsc::UnboundedSender<PollEvent>,
        sink: Arc<dyn NotificationSink>,
        interval: Duration,
    ) {
        self.stop();
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let task = tokio::spawn(run(api, store_id, events, sink, cancel_rx, interval));
        self.cancel = Some(cancel_tx);
        self.task = Some(task);
    }

    /// Cancel the current cycle. Idempotent.
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

impl Drop for PendingWatch {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run(
    api: ApiClient,
    store_id: Option<StoreId>,
    events: mpsc::UnboundedSender<PollEvent>,
    sink: Arc<dyn NotificationSink>,
    mut cancel: watch::Receiver<bool>,
    interval: Duration,
) {
    let path = orders_path(store_id);
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut previous_pending: usize = 0;

    loop {
        tokio::select! {
            _ = cancel.changed() => break,
            _ = ticker.tick() => {}
        }

        let fetched = tokio::select! {
            _ = cancel.changed() => break,
            result = api.get_value(&path) => result,
        };

        match fetched {
            Ok(value) => {
                let orders = orders_from_value(&value);
                let pending = pending_count(&orders);
                if should_notify(previous_pending, pending) {
                    sink.notify();
                }
                previous_pending = pending;
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
