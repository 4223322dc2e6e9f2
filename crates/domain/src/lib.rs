//! Domain layer for the campus repair backend.
//!
//! This crate contains:
//! - Domain models (User, LocationUnit, RepairRequest, RequestImage, audit entries)
//! - The request lifecycle authorizer and attachment rules
//! - Notification intents and the notification service trait
//! - Domain error types

pub mod error;
pub mod models;
pub mod services;

pub use error::DomainError;
