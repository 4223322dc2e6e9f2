//! Field-level change tracking for the request audit trail.

use chrono::{DateTime, Utc};

use crate::models::{FieldChange, RepairRequest};

/// Collects changed fields, skipping values that did not change.
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    changes: Vec<FieldChange>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `field` if `old` and `new` differ.
    pub fn track(mut self, field: &str, old: Option<String>, new: Option<String>) -> Self {
        if old != new {
            self.changes.push(FieldChange {
                field: field.to_string(),
                old_value: old,
                new_value: new,
            });
        }
        self
    }

    pub fn into_changes(self) -> Vec<FieldChange> {
        self.changes
    }
}

fn text(value: &str) -> Option<String> {
    Some(value.to_string())
}

fn timestamp(value: Option<DateTime<Utc>>) -> Option<String> {
    value.map(|v| v.to_rfc3339())
}

/// Every audited field that differs between two versions of a request.
pub fn diff_requests(before: &RepairRequest, after: &RepairRequest) -> Vec<FieldChange> {
    ChangeSet::new()
        .track("name", text(&before.name), text(&after.name))
        .track(
            "type_request",
            text(before.type_request.as_str()),
            text(after.type_request.as_str()),
        )
        .track("description", text(&before.description), text(&after.description))
        .track(
            "location_unit_id",
            Some(before.location_unit_id.to_string()),
            Some(after.location_unit_id.to_string()),
        )
        .track("room_number", before.room_number.clone(), after.room_number.clone())
        .track(
            "entrance_number",
            before.entrance_number.clone(),
            after.entrance_number.clone(),
        )
        .track("status", text(before.status.as_str()), text(after.status.as_str()))
        .track(
            "rejection_comment",
            before.rejection_comment.clone(),
            after.rejection_comment.clone(),
        )
        .track(
            "assigned_master_name",
            before.assigned_master_name.clone(),
            after.assigned_master_name.clone(),
        )
        .track(
            "assigned_master_company",
            before.assigned_master_company.clone(),
            after.assigned_master_company.clone(),
        )
        .track(
            "assigned_master_phone",
            before.assigned_master_phone.clone(),
            after.assigned_master_phone.clone(),
        )
        .track(
            "assigned_company_phone",
            before.assigned_company_phone.clone(),
            after.assigned_company_phone.clone(),
        )
        .track("work_date", timestamp(before.work_date), timestamp(after.work_date))
        .track(
            "user_confirmed",
            Some(before.user_confirmed.to_string()),
            Some(after.user_confirmed.to_string()),
        )
        .track(
            "completed_at",
            timestamp(before.completed_at),
            timestamp(after.completed_at),
        )
        .into_changes()
}
