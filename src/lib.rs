//! # MutualRisk - portfolio terminal client
//!
//! A terminal client for the MutualRisk backend: browse your portfolios,
//! compare their backtests against the latest one, manage bookmarked assets,
//! and build a new portfolio from per-asset weight constraints.
//!
//! ## Architecture
//!
//! - **App**: event loop and network side effects
//! - **State**: centralized store with a pure reducer
//! - **API**: typed HTTP client, response schemas and a query cache
//! - **Events**: keyboard input mapped to actions
//! - **UI**: layout and rendering
//! - **Config**: configuration management

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod events;
pub mod state;
pub mod ui;

pub use app::App;
pub use config::Config;
pub use error::{Error, Result};
