//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod audit_log;
pub mod location_unit;
pub mod repair_request;
pub mod request_image;
pub mod user;

pub use audit_log::RequestAuditLogEntity;
pub use location_unit::{LocationTypeDb, LocationUnitEntity};
pub use repair_request::{RepairRequestEntity, RequestStatusDb, RequestTypeDb};
pub use request_image::RequestImageEntity;
pub use user::{RegistrationCodeEntity, UserEntity, UserRoleDb, UserSessionEntity};
