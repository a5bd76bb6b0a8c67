//! Stonefire Storefront - Customer ordering client.
//!
//! This library is the customer-facing core of the Stonefire ordering
//! platform: everything a UI layer needs short of rendering. The REST
//! backend is the source of truth; this crate orchestrates it.
//!
//! # Architecture
//!
//! - [`api::ApiClient`] - typed `reqwest` client for the ordering backend,
//!   with bearer-token auth, request timeouts, and a global unauthorized hook
//! - [`cart::CartStore`] - cart state, local or backend-backed, reconciled
//!   by refetching after every write
//! - [`checkout`] - delivery form validation and the order/payment flow
//! - [`session::Session`] - login, signup, and token restoration
//! - [`poller::OrderWatch`] - cancellable 5-second order-status polling
//! - [`state::App`] - the single context object owning all of the above
//!
//! # Example
//!
//! ```rust,ignore
//! use stonefire_storefront::{config::StorefrontConfig, state::App};
//!
//! let config = StorefrontConfig::from_env()?;
//! let mut app = App::new(config)?;
//! app.bootstrap().await;
//!
//! let menu = app.api().unwrap().products(None).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod poller;
pub mod pricing;
pub mod session;
pub mod state;
pub mod storage;
