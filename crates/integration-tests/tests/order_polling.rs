//! Polling behavior: the admin pending-count notification rule, the
//! customer status-change rule, unauthorized termination, and cancellation.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::{Value, json};
use tokio::sync::mpsc;

use stonefire_admin::client::AdminClient;
use stonefire_admin::poller::PendingWatch;
use stonefire_integration_tests::MockBackend;
use stonefire_storefront::poller::{NotificationSink, OrderWatch, PollEvent};
use stonefire_storefront::state::App;

const FAST_POLL: Duration = Duration::from_millis(20);

struct CountingSink(AtomicUsize);

impl CountingSink {
    fn new() -> Arc<Self> {
        Arc::new(Self(AtomicUsize::new(0)))
    }

    fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl NotificationSink for CountingSink {
    fn notify(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Spin until `check` passes or five seconds elapse.
async fn wait_for(mut check: impl FnMut() -> bool) {
    for _ in 0..500 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached within 5s");
}

fn pending_orders(count: usize) -> Value {
    let orders: Vec<Value> = (0..count)
        .map(|i| json!({"id": i + 1, "status": "PENDING"}))
        .collect();
    Value::Array(orders)
}

async fn signed_in_admin(mock: &MockBackend) -> AdminClient {
    let mut client = AdminClient::new(&mock.admin_config()).unwrap();
    client
        .login("owner@example.com", "admin-pass", None)
        .await
        .unwrap();
    client
}

#[tokio::test]
async fn admin_pending_sequence_notifies_exactly_once() {
    let mock = MockBackend::spawn().await;
    // Pending counts [0, 2, 2, 5]; the second body is wrapped to prove
    // normalization happens inside the poll loop too.
    mock.state().admin_orders_script = vec![
        pending_orders(0),
        json!({"orders": pending_orders(2)}),
        pending_orders(2),
        pending_orders(5),
    ];

    let client = signed_in_admin(&mock).await;
    let sink = CountingSink::new();
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();

    let mut watch = PendingWatch::new();
    watch.start_with_interval(
        client.api().clone(),
        None,
        events_tx,
        sink.clone(),
        FAST_POLL,
    );

    // Let the script play out past its end (the last body repeats)
    wait_for(|| mock.state().admin_orders_calls >= 7).await;
    watch.stop();

    assert_eq!(sink.count(), 1, "only the 2 -> 5 transition may ring");

    // The view saw every successful fetch
    let mut batches = 0;
    while let Ok(event) = events_rx.try_recv() {
        if matches!(event, PollEvent::Orders(_)) {
            batches += 1;
        }
    }
    assert!(batches >= 4);
}

#[tokio::test]
async fn admin_watch_restart_cancels_prior_cycle() {
    let mock = MockBackend::spawn().await;
    let client = signed_in_admin(&mock).await;
    let sink = CountingSink::new();
    let (events_tx, _events_rx) = mpsc::unbounded_channel();

    let mut watch = PendingWatch::new();
    watch.start_with_interval(
        client.api().clone(),
        None,
        events_tx.clone(),
        sink.clone(),
        FAST_POLL,
    );
    wait_for(|| mock.state().admin_orders_calls >= 2).await;

    // Restarting must not leave two concurrent intervals behind
    watch.start_with_interval(client.api().clone(), None, events_tx, sink, FAST_POLL);
    wait_for(|| mock.state().admin_orders_calls >= 4).await;
    watch.stop();
    watch.stop(); // idempotent

    // Let any in-flight request land before sampling the counter
    tokio::time::sleep(Duration::from_millis(60)).await;
    let calls_after_stop = mock.state().admin_orders_calls;
    tokio::time::sleep(Duration::from_millis(120)).await;
    assert_eq!(
        mock.state().admin_orders_calls,
        calls_after_stop,
        "a stopped watch must not keep fetching"
    );
    assert!(!watch.is_running());
}

#[tokio::test]
async fn customer_watch_rings_on_status_change() {
    let mock = MockBackend::spawn().await;
    let order_id = mock.state().seed_order(1, "PENDING", 14.50);

    let mut app = App::new(mock.storefront_config()).unwrap();
    app.bootstrap().await;
    app.session_mut()
        .unwrap()
        .login("ada@example.com", "correct-horse")
        .await
        .unwrap();

    let sink = CountingSink::new();
    let (events_tx, _events_rx) = mpsc::unbounded_channel();
    let mut watch = OrderWatch::new();
    watch.start_with_interval(
        app.api().unwrap().clone(),
        events_tx,
        sink.clone(),
        FAST_POLL,
    );

    // A few steady polls: no notification
    wait_for(|| mock.state().orders_calls >= 3).await;
    assert_eq!(sink.count(), 0);

    // The store accepts the order; the next diff must ring exactly once
    {
        let mut state = mock.state();
        let order = state
            .orders
            .iter_mut()
            .find(|order| order["id"].as_i64() == Some(order_id))
            .unwrap();
        order["status"] = json!("ACCEPTED");
    }
    wait_for(|| sink.count() >= 1).await;

    let calls_at_ring = mock.state().orders_calls;
    wait_for(|| mock.state().orders_calls >= calls_at_ring + 2).await;
    watch.stop();
    assert_eq!(sink.count(), 1, "an unchanged status must not keep ringing");
}

#[tokio::test]
async fn unauthorized_poll_signs_out_and_terminates() {
    let mock = MockBackend::spawn().await;
    let mut app = App::new(mock.storefront_config()).unwrap();
    app.bootstrap().await;
    app.session_mut()
        .unwrap()
        .login("ada@example.com", "correct-horse")
        .await
        .unwrap();

    let signed_out = Arc::new(AtomicUsize::new(0));
    let hook_counter = signed_out.clone();
    app.session()
        .unwrap()
        .install_sign_out_hook(move || {
            hook_counter.fetch_add(1, Ordering::SeqCst);
        });

    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let mut watch = OrderWatch::new();
    watch.start_with_interval(
        app.api().unwrap().clone(),
        events_tx,
        CountingSink::new(),
        FAST_POLL,
    );
    wait_for(|| mock.state().orders_calls >= 2).await;

    mock.state().force_unauthorized = true;

    // Terminal event, hook fired once, task gone
    let mut saw_expired = false;
    wait_for(|| {
        while let Ok(event) = events_rx.try_recv() {
            if matches!(event, PollEvent::SessionExpired) {
                saw_expired = true;
            }
        }
        saw_expired
    })
    .await;
    wait_for(|| !watch.is_running()).await;

    assert_eq!(signed_out.load(Ordering::SeqCst), 1);
    assert!(!app.session().unwrap().is_authenticated());

    tokio::time::sleep(Duration::from_millis(60)).await;
    let calls_after = mock.state().orders_calls;
    tokio::time::sleep(Duration::from_millis(120)).await;
    assert_eq!(
        mock.state().orders_calls,
        calls_after,
        "polling must stop after an unauthorized response"
    );
}

#[tokio::test]
async fn poll_errors_are_surfaced_and_polling_continues() {
    let mock = MockBackend::spawn().await;
    let mut app = App::new(mock.storefront_config()).unwrap();
    app.bootstrap().await;
    app.session_mut()
        .unwrap()
        .login("ada@example.com", "correct-horse")
        .await
        .unwrap();

    mock.state().wrap_orders_key = Some("data");

    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let mut watch = OrderWatch::new();
    watch.start_with_interval(
        app.api().unwrap().clone(),
        events_tx,
        CountingSink::new(),
        FAST_POLL,
    );
    wait_for(|| mock.state().orders_calls >= 2).await;

    // Break the endpoint: errors are reported, polling does not stop
    mock.state().orders_fail = true;
    let calls_before = mock.state().orders_calls;
    wait_for(|| mock.state().orders_calls >= calls_before + 3).await;
    assert!(watch.is_running());

    // Heal it: fetches resume producing order lists
    mock.state().orders_fail = false;
    let calls_healed = mock.state().orders_calls;
    wait_for(|| mock.state().orders_calls >= calls_healed + 2).await;
    watch.stop();

    let mut saw_orders = false;
    let mut saw_error = false;
    while let Ok(event) = events_rx.try_recv() {
        match event {
            PollEvent::Orders(_) => saw_orders = true,
            PollEvent::Error(message) => {
                saw_error = true;
                assert_eq!(message, "order lookup failed");
            }
            PollEvent::SessionExpired => panic!("a 500 must not end the session"),
        }
    }
    assert!(saw_orders);
    assert!(saw_error);
}
