//! Store administration commands.

use std::sync::Arc;

use chrono::Utc;
use clap::Subcommand;
use tokio::sync::mpsc;

use stonefire_admin::client::AdminClient;
use stonefire_admin::config::AdminConfig;
use stonefire_admin::poller::PendingWatch;
use stonefire_admin::stats::DashboardStats;
use stonefire_admin::types::StoreDescriptor;
use stonefire_core::{OrderStatus, StoreId};
use stonefire_storefront::poller::PollEvent;

use super::TerminalBell;
use super::orders::print_orders;

#[derive(Subcommand)]
pub enum AdminAction {
    /// Sign in as a store admin
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
        /// Attach to this store by name on first login
        #[arg(long)]
        store_name: Option<String>,
    },
    /// Sign out
    Logout,
    /// Show the signed-in admin and store
    Me,
    /// List the store's orders
    Orders {
        /// Explicit store scope (super admins)
        #[arg(long)]
        store_id: Option<i64>,
    },
    /// Move an order to a new status
    SetStatus {
        #[arg(long)]
        order: i64,
        /// PENDING, ACCEPTED, PREPARING, READY, OUT_FOR_DELIVERY,
        /// DELIVERED, or REJECTED
        #[arg(long)]
        status: String,
    },
    /// Show or toggle whether the store accepts orders
    Store {
        #[command(subcommand)]
        action: StoreAction,
    },
    /// Show dashboard stats for the store's orders
    Stats,
    /// Poll the store's orders every 5 seconds; rings the bell when new
    /// pending orders arrive. Ctrl-C to stop.
    Watch,
}

#[derive(Subcommand)]
pub enum StoreAction {
    /// Show the store
    Show,
    /// Start accepting orders
    Open,
    /// Stop accepting orders
    Close,
}

async fn load_admin() -> Result<AdminClient, Box<dyn std::error::Error>> {
    let config = AdminConfig::from_env()?;
    let mut client = AdminClient::new(&config)?;
    client.restore().await;
    Ok(client)
}

pub async fn run(action: AdminAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut client = load_admin().await?;

    match action {
        AdminAction::Login {
            email,
            password,
            store_name,
        } => {
            let store = store_name.map(|name| StoreDescriptor {
                name,
                address: None,
                city: None,
                state: None,
                pincode: None,
                phone: None,
            });
            match client.login(&email, &password, store).await {
                Ok(identity) => {
                    let name = identity.name.unwrap_or_else(|| "admin".to_string());
                    match identity.store_id {
                        Some(store_id) => println!("signed in as {name} (store {store_id})"),
                        None => println!("signed in as {name}"),
                    }
                }
                Err(stonefire_admin::AdminError::Api(e)) => match e.field() {
                    Some(field) => return Err(format!("{} ({field})", e.user_message()).into()),
                    None => return Err(e.user_message().into()),
                },
                Err(e) => return Err(e.into()),
            }
        }
        AdminAction::Logout => {
            client.logout()?;
            println!("signed out");
        }
        AdminAction::Me => {
            let profile = client.me().await?;
            println!(
                "{} <{}>",
                profile.name.as_deref().unwrap_or("admin"),
                profile.email.as_deref().unwrap_or("-")
            );
            if let Some(store) = profile.store {
                let state = if store.is_active { "open" } else { "closed" };
                println!("store: {} ({state})", store.name);
            }
        }
        AdminAction::Orders { store_id } => {
            let orders = client.orders(store_id.map(StoreId::new)).await?;
            print_orders(&orders);
        }
        AdminAction::SetStatus { order, status } => {
            let status: OrderStatus = status.parse()?;
            client
                .set_order_status(stonefire_core::OrderId::new(order), status)
                .await?;
            println!("order #{order} -> {status}");
        }
        AdminAction::Store { action } => match action {
            StoreAction::Show => {
                let store = client.store().await?;
                let state = if store.is_active { "open" } else { "closed" };
                println!("{} ({state})", store.name);
                if let Some(address) = store.address {
                    println!("{address}");
                }
            }
            StoreAction::Open => {
                client.set_store_active(true).await?;
                println!("store is accepting orders");
            }
            StoreAction::Close => {
                client.set_store_active(false).await?;
                println!("store is closed to new orders");
            }
        },
        AdminAction::Stats => {
            let orders = client.orders(None).await?;
            let stats = DashboardStats::from_orders(&orders, Utc::now());
            println!("orders today: {}", stats.total_today);
            for (status, count) in &stats.by_status {
                println!("{status:<17} {count}");
            }
        }
        AdminAction::Watch => {
            let store_id = client.store_id();
            let (events_tx, mut events_rx) = mpsc::unbounded_channel();
            let mut watch = PendingWatch::new();
            watch.start(
                client.api().clone(),
                store_id,
                events_tx,
                Arc::new(TerminalBell),
            );

            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => break,
                    event = events_rx.recv() => match event {
                        Some(PollEvent::Orders(orders)) => print_orders(&orders),
                        Some(PollEvent::Error(message)) => eprintln!("poll error: {message}"),
                        Some(PollEvent::SessionExpired) => {
                            eprintln!("admin session expired; sign in again");
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
