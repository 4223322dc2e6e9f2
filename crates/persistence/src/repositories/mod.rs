//! Repository implementations for database operations.

pub mod audit_log;
pub mod location_unit;
pub mod repair_request;
pub mod request_image;
pub mod user;

pub use audit_log::AuditLogRepository;
pub use location_unit::LocationUnitRepository;
pub use repair_request::{
    NewRepairRequest, PurgedRequests, RepairRequestRepository, RequestListFilter,
};
pub use request_image::{NewRequestImage, RequestImageRepository};
pub use user::{NewUser, RegistrationCodeRepository, SessionRepository, UserRepository};
