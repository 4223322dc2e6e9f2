//! Request image domain models.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// An image attached to a repair request.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestImage {
    pub id: Uuid,
    pub request_id: Uuid,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    /// Key of the stored file inside the image store.
    pub storage_key: String,
    pub uploaded_at: DateTime<Utc>,
}

/// An uploaded file that passed validation but is not yet stored.
#[derive(Debug, Clone)]
pub struct IncomingImage {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct RequestImageResponse {
    pub id: Uuid,
    pub request_id: Uuid,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub url: String,
    pub uploaded_at: DateTime<Utc>,
}

impl From<RequestImage> for RequestImageResponse {
    fn from(image: RequestImage) -> Self {
        Self {
            url: format!("/api/v1/request-images/{}/file", image.id),
            id: image.id,
            request_id: image.request_id,
            file_name: image.file_name,
            content_type: image.content_type,
            size_bytes: image.size_bytes,
            uploaded_at: image.uploaded_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadImagesResponse {
    pub uploaded: Vec<RequestImageResponse>,
    pub total_images: i64,
}
