//! Customer order commands.

use std::sync::Arc;

use clap::Subcommand;
use tokio::sync::mpsc;

use stonefire_storefront::api::normalize::OrderSummary;
use stonefire_storefront::poller::{OrderWatch, PollEvent};

use super::{TerminalBell, load_app};

#[derive(Subcommand)]
pub enum OrdersAction {
    /// List your orders
    List,
    /// Poll your orders every 5 seconds; rings the bell when a status
    /// changes. Ctrl-C to stop.
    Watch,
}

pub async fn run(action: OrdersAction) -> Result<(), Box<dyn std::error::Error>> {
    let app = load_app().await?;
    let api = app.api().ok_or("STONEFIRE_API_URL is not set")?;

    match action {
        OrdersAction::List => {
            let orders = api.orders().await?;
            print_orders(&orders);
        }
        OrdersAction::Watch => {
            let (events_tx, mut events_rx) = mpsc::unbounded_channel();
            let mut watch = OrderWatch::new();
            watch.start(api.clone(), events_tx, Arc::new(TerminalBell));

            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => break,
                    event = events_rx.recv() => match event {
                        Some(PollEvent::Orders(orders)) => print_orders(&orders),
                        Some(PollEvent::Error(message)) => eprintln!("poll error: {message}"),
                        Some(PollEvent::SessionExpired) => {
                            eprintln!("session expired; sign in again");
                            break;
                        }
                        None => break,
                    },
                }
            }
            watch.stop();
        }
    }
    Ok(())
}

pub fn print_orders(orders: &[OrderSummary]) {
    if orders.is_empty() {
        println!("no orders");
        return;
    }
    for order in orders {
        let status = order
            .status
            .clone()
            .unwrap_or_else(|| "UNKNOWN".to_string());
        let total = order
            .total
            .map_or_else(|| "-".to_string(), |total| total.display());
        let when = order
            .created_at()
            .map_or_else(String::new, |at| at.format(" %Y-%m-%d %H:%M").to_string());
        println!("#{:<6} {:<16} {:>8}{when}", order.id, status, total);
    }
}
