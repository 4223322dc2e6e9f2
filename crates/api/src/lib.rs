//! Campus repair request tracker: HTTP API library.
//!
//! The binary in `main.rs` wires configuration, the database and the job
//! scheduler around [`app::create_app`]. Integration tests build the same router.

pub mod app;
pub mod config;
pub mod error;
pub mod extractors;
pub mod jobs;
pub mod middleware;
pub mod routes;
pub mod services;
