//! HTTP route handlers.

pub mod auth;
pub mod health;
pub mod images;
pub mod location_units;
pub mod requests;
