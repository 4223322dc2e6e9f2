//! Request image entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::RequestImage;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the request_images table.
#[derive(Debug, Clone, FromRow)]
pub struct RequestImageEntity {
    pub id: Uuid,
    pub request_id: Uuid,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub storage_key: String,
    pub uploaded_at: DateTime<Utc>,
}

impl From<RequestImageEntity> for RequestImage {
    fn from(entity: RequestImageEntity) -> Self {
        Self {
            id: entity.id,
            request_id: entity.request_id,
            file_name: entity.file_name,
            content_type: entity.content_type,
            size_bytes: entity.size_bytes,
            storage_key: entity.storage_key,
            uploaded_at: entity.uploaded_at,
        }
    }
}
