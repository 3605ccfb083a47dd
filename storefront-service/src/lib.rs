//! Storefront backend: user directory with role promotion, session tokens,
//! order/payment lifecycle against a remote payment gateway, and the thin
//! public catalog (products, reviews, carts).

pub mod app;
pub mod catalog_handlers;
pub mod config;
pub mod gateway;
pub mod order_handlers;
pub mod repo;
pub mod user_handlers;

pub use app::{build_router, AppState};
pub use config::AppConfig;
