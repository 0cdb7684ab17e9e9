//! Storefront
//!
//! Storefront is the client core of a food delivery shop: cart state, order
//! tracking, session persistence, route gating and a single API gateway
//! client for the backend.

pub mod api;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod fixtures;
pub mod foods;
pub mod guard;
pub mod ids;
pub mod observability;
pub mod orders;
pub mod prelude;
pub mod prices;
pub mod render;
pub mod session;
pub mod storefront;
