//! Stonefire Admin - Store administration client.
//!
//! The dashboard-side counterpart to `stonefire-storefront`: store admins
//! sign in with a separately namespaced token, watch incoming orders (with a
//! notification when new pending orders arrive), move orders through their
//! lifecycle, toggle whether the store accepts orders, and read dashboard
//! stats.
//!
//! HTTP plumbing (typed requests, `detail` error parsing, the global 401
//! hook) is shared with the storefront crate; everything admin-specific
//! lives here.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod client;
pub mod config;
pub mod poller;
pub mod stats;
pub mod types;

pub use client::{AdminClient, AdminError, AdminIdentity};
pub use poller::PendingWatch;
pub use stats::DashboardStats;
