//! Request audit log entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::RequestAuditEntry;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the request_audit_logs table.
#[derive(Debug, Clone, FromRow)]
pub struct RequestAuditLogEntity {
    pub id: i64,
    pub request_id: Uuid,
    pub actor_id: Option<Uuid>,
    pub field: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub changed_at: DateTime<Utc>,
}

impl From<RequestAuditLogEntity> for RequestAuditEntry {
    fn from(entity: RequestAuditLogEntity) -> Self {
        Self {
            id: entity.id,
            request_id: entity.request_id,
            actor_id: entity.actor_id,
            field: entity.field,
            old_value: entity.old_value,
            new_value: entity.new_value,
            changed_at: entity.changed_at,
        }
    }
}
