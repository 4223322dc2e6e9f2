//! Application services and external integrations.

pub mod auth;
pub mod email;
pub mod notifications;
pub mod storage;

pub use auth::AuthService;
pub use email::EmailService;
pub use notifications::NotificationDispatcher;
pub use storage::{ImageStorage, LocalImageStorage};
