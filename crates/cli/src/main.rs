//! Stonefire CLI - drive the storefront and admin clients from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse the menu and pick a store
//! sf-cli menu products
//! sf-cli locations select 3
//!
//! # Sign in, fill a cart, check out
//! sf-cli auth login --email you@example.com --password ...
//! sf-cli cart add --product-id 7 --qty 2 --crust "Thin=0"
//! sf-cli checkout --name "Ada" --email you@example.com --phone 555-0100 \
//!     --address "1 Main St" --city Springfield --zip 12345 --method cash
//!
//! # Store side: watch for incoming orders (rings the terminal bell)
//! sf-cli admin login --email owner@example.com --password ...
//! sf-cli admin watch
//! ```
//!
//! Configuration comes from the environment (see the library crates):
//! `STONEFIRE_API_URL`, `STONEFIRE_STATE_PATH`, `STONEFIRE_ADMIN_STATE_PATH`,
//! `STONEFIRE_TIMEOUT_SECS`, `SENTRY_DSN`.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::print_stdout, clippy::print_stderr)]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "sf-cli")]
#[command(author, version, about = "Stonefire ordering CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the menu catalog
    Menu {
        #[command(subcommand)]
        action: commands::menu::MenuAction,
    },
    /// List, search, and select store locations
    Locations {
        #[command(subcommand)]
        action: commands::menu::LocationAction,
    },
    /// Customer account commands
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
    /// Inspect and mutate the cart
    Cart {
        #[command(subcommand)]
        action: commands::cart::CartAction,
    },
    /// Place an order from the current cart
    Checkout(commands::checkout::CheckoutArgs),
    /// List or watch your orders
    Orders {
        #[command(subcommand)]
        action: commands::orders::OrdersAction,
    },
    /// Store administration commands
    Admin {
        #[command(subcommand)]
        action: commands::admin::AdminAction,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry() -> Option<sentry::ClientInitGuard> {
    let dsn = std::env::var("SENTRY_DSN").ok()?;
    let guard = sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));
    tracing::info!("Sentry initialized");
    Some(guard)
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let _sentry_guard = init_sentry();

    let cli = Cli::parse();
    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Menu { action } => commands::menu::run_menu(action).await?,
        Commands::Locations { action } => commands::menu::run_locations(action).await?,
        Commands::Auth { action } => commands::auth::run(action).await?,
        Commands::Cart { action } => commands::cart::run(action).await?,
        Commands::Checkout(args) => commands::checkout::run(args).await?,
        Commands::Orders { action } => commands::orders::run(action).await?,
        Commands::Admin { action } => commands::admin::run(action).await?,
    }
    Ok(())
}
