//! Request audit trail models.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A single changed field, with values rendered as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldChange {
    pub field: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

/// A stored audit row for one field of one request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct RequestAuditEntry {
    pub id: i64,
    pub request_id: Uuid,
    pub actor_id: Option<Uuid>,
    pub field: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub changed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestHistoryResponse {
    pub request_id: Uuid,
    pub entries: Vec<RequestAuditEntry>,
}
