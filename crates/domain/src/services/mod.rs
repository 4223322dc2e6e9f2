//! Domain services for the campus repair backend.
//!
//! Services contain business logic that operates on domain models.

pub mod attachments;
pub mod audit;
pub mod notification;
pub mod transition;

pub use attachments::{
    authorize_delete, authorize_upload, authorize_view, ensure_capacity, validate_upload,
    MAX_IMAGES_PER_REQUEST,
};
pub use audit::{diff_requests, ChangeSet};
pub use notification::{
    build_notifications, Audience, MockNotificationService, Notification, NotificationResult,
    NotificationService,
};
pub use transition::{
    authorize_confirm, authorize_submit, can_set_done, policy_for, Decision, ManagerPolicy,
    OwnerPolicy, TransitionContext, TransitionEvent, TransitionPolicy,
};
