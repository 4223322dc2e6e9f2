//! Image attachment rules.

use uuid::Uuid;

use crate::models::{RepairRequest, Role};
use crate::DomainError;

/// Maximum number of images per request.
pub const MAX_IMAGES_PER_REQUEST: i64 = 5;

fn validation_message(err: validator::ValidationError) -> DomainError {
    DomainError::validation(
        err.message
            .map(|m| m.to_string())
            .unwrap_or_else(|| "Invalid image".to_string()),
    )
}

/// Checks format and size of one uploaded file.
pub fn validate_upload(file_name: &str, size: usize) -> Result<(), DomainError> {
    shared::validation::validate_image_extension(file_name).map_err(validation_message)?;
    shared::validation::validate_image_size(file_name, size).map_err(validation_message)
}

/// Rejects a batch that would push the request past the image cap.
pub fn ensure_capacity(existing: i64, incoming: usize) -> Result<(), DomainError> {
    if incoming == 0 {
        return Err(DomainError::validation("No images provided"));
    }

    let total = existing.saturating_add(incoming as i64);
    if total > MAX_IMAGES_PER_REQUEST {
        return Err(DomainError::validation(format!(
            "A request can have at most {} images ({} attached, {} uploaded)",
            MAX_IMAGES_PER_REQUEST, existing, incoming
        )));
    }
    Ok(())
}

/// Only the owner may upload.
pub fn authorize_upload(actor_id: Uuid, request: &RepairRequest) -> Result<(), DomainError> {
    if request.is_owned_by(actor_id) {
        Ok(())
    } else {
        Err(DomainError::permission_denied(
            "Only the owner can upload images to this request",
        ))
    }
}

/// The owner and managers may list and download.
pub fn authorize_view(
    actor_id: Uuid,
    role: Role,
    request: &RepairRequest,
) -> Result<(), DomainError> {
    if request.is_visible_to(actor_id, role) {
        Ok(())
    } else {
        Err(DomainError::permission_denied(
            "You do not have access to this request's images",
        ))
    }
}

/// Only the owner may delete, managers included in the refusal.
pub fn authorize_delete(actor_id: Uuid, request: &RepairRequest) -> Result<(), DomainError> {
    if request.is_owned_by(actor_id) {
        Ok(())
    } else {
        Err(DomainError::permission_denied(
            "Only the owner can delete images of this request",
        ))
    }
}
