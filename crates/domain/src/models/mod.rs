//! Domain models for the campus repair backend.

pub mod audit_log;
pub mod location_unit;
pub mod repair_request;
pub mod request_image;
pub mod user;

pub use audit_log::{FieldChange, RequestAuditEntry, RequestHistoryResponse};
pub use location_unit::{LocationKind, LocationUnit};
pub use repair_request::{
    AssignedMaster, CreateRepairRequest, ListRequestsQuery, ListRequestsResponse, RepairRequest,
    RepairRequestResponse, RequestListItem, RequestPatch, RequestStatus, RequestType,
};
pub use request_image::{IncomingImage, RequestImage, RequestImageResponse, UploadImagesResponse};
pub use user::{
    LoginRequest, LoginResponse, RegisterRequest, RegistrationCode, Role, User, UserSummary,
    VerifyCodeRequest, VerifyCodeResponse,
};
