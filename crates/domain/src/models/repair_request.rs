//! Repair request domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use super::user::Role;
use crate::services::transition::Decision;
use crate::DomainError;

/// Maximum length of a request name.
pub const MAX_NAME_LEN: usize = 255;

/// Lifecycle status of a repair request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Empty,
    Pending,
    Approved,
    Rejected,
    OnCheck,
    Done,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 6] = [
        RequestStatus::Empty,
        RequestStatus::Pending,
        RequestStatus::Approved,
        RequestStatus::Rejected,
        RequestStatus::OnCheck,
        RequestStatus::Done,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Empty => "empty",
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
            RequestStatus::OnCheck => "on_check",
            RequestStatus::Done => "done",
        }
    }

    /// Statuses that count as "in flight" for the duplicate check.
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            RequestStatus::Empty
                | RequestStatus::Pending
                | RequestStatus::Approved
                | RequestStatus::OnCheck
        )
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RequestStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Unknown request status: {}", s))
    }
}

/// Category of the repair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    ElectricalAppliances,
    Electricity,
    Plumbing,
    Heating,
    Ventilation,
    Internet,
    Furniture,
    WindowsDoors,
    Other,
}

impl RequestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::ElectricalAppliances => "electrical_appliances",
            RequestType::Electricity => "electricity",
            RequestType::Plumbing => "plumbing",
            RequestType::Heating => "heating",
            RequestType::Ventilation => "ventilation",
            RequestType::Internet => "internet",
            RequestType::Furniture => "furniture",
            RequestType::WindowsDoors => "windows_doors",
            RequestType::Other => "other",
        }
    }
}

impl std::fmt::Display for RequestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A repair request.
#[derive(Debug, Clone, PartialEq)]
pub struct RepairRequest {
    pub id: Uuid,
    pub code: String,
    pub owner_id: Uuid,
    pub name: String,
    pub type_request: RequestType,
    pub description: String,
    pub location_unit_id: i64,
    pub room_number: Option<String>,
    pub entrance_number: Option<String>,
    pub status: RequestStatus,
    pub rejection_comment: Option<String>,
    pub assigned_master_name: Option<String>,
    pub assigned_master_company: Option<String>,
    pub assigned_master_phone: Option<String>,
    pub assigned_company_phone: Option<String>,
    pub work_date: Option<DateTime<Utc>>,
    pub user_confirmed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RepairRequest {
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }

    /// Owners and managers may read a request.
    pub fn is_visible_to(&self, user_id: Uuid, role: Role) -> bool {
        role.is_manager() || self.is_owned_by(user_id)
    }

    /// Owners only see the assigned master once work is scheduled.
    pub fn master_visible_to(&self, role: Role) -> bool {
        role.is_manager() || matches!(self.status, RequestStatus::OnCheck | RequestStatus::Done)
    }

    /// Returns a copy with the patch fields and the authorized decision applied.
    pub fn apply(&self, patch: &RequestPatch, decision: &Decision) -> RepairRequest {
        let mut next = self.clone();

        if let Some(name) = &patch.name {
            next.name = name.clone();
        }
        if let Some(type_request) = patch.type_request {
            next.type_request = type_request;
        }
        if let Some(description) = &patch.description {
            next.description = description.clone();
        }
        if let Some(location_unit_id) = patch.location_unit_id {
            next.location_unit_id = location_unit_id;
        }
        if let Some(room) = &patch.room_number {
            next.room_number = room.clone();
        }
        if let Some(entrance) = &patch.entrance_number {
            next.entrance_number = entrance.clone();
        }
        if let Some(comment) = &patch.rejection_comment {
            next.rejection_comment = comment.clone();
        }
        if let Some(v) = &patch.assigned_master_name {
            next.assigned_master_name = v.clone();
        }
        if let Some(v) = &patch.assigned_master_company {
            next.assigned_master_company = v.clone();
        }
        if let Some(v) = &patch.assigned_master_phone {
            next.assigned_master_phone = v.clone();
        }
        if let Some(v) = &patch.assigned_company_phone {
            next.assigned_company_phone = v.clone();
        }
        if let Some(work_date) = patch.work_date {
            next.work_date = work_date;
        }

        next.status = decision.status;
        next.completed_at = decision.completed_at;
        if decision.clear_confirmation {
            next.user_confirmed = false;
        }
        next
    }
}

/// Contact details of the maintenance contact handling a request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct AssignedMaster {
    pub name: Option<String>,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub company_phone: Option<String>,
    pub work_date: Option<DateTime<Utc>>,
}

impl From<&RepairRequest> for AssignedMaster {
    fn from(request: &RepairRequest) -> Self {
        Self {
            name: request.assigned_master_name.clone(),
            company: request.assigned_master_company.clone(),
            phone: request.assigned_master_phone.clone(),
            company_phone: request.assigned_company_phone.clone(),
            work_date: request.work_date,
        }
    }
}

/// Body of `POST /requests`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRepairRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    pub type_request: RequestType,

    #[serde(default)]
    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: String,

    pub location_unit_id: i64,

    #[validate(length(max = 32, message = "Room number must be at most 32 characters"))]
    pub room_number: Option<String>,

    #[validate(length(max = 16, message = "Entrance number must be at most 16 characters"))]
    pub entrance_number: Option<String>,
}

impl CreateRepairRequest {
    /// Trims text fields and turns blank optionals into `None`.
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.description = self.description.trim().to_string();
        self.room_number = blank_to_none(self.room_number);
        self.entrance_number = blank_to_none(self.entrance_number);
        self
    }
}

/// Fields a student or lecturer may edit.
pub const OWNER_FIELDS: [&str; 6] = [
    "name",
    "type_request",
    "description",
    "location_unit_id",
    "room_number",
    "entrance_number",
];

/// Fields whose write assigns a master and moves the request to `on_check`.
pub const MASTER_FIELDS: [&str; 5] = [
    "assigned_master_name",
    "assigned_master_company",
    "assigned_master_phone",
    "assigned_company_phone",
    "work_date",
];

/// Body of `PATCH /requests/{id}`.
///
/// Nullable columns use `Option<Option<T>>`: absent means untouched,
/// `null` clears the value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestPatch {
    pub name: Option<String>,
    pub type_request: Option<RequestType>,
    pub description: Option<String>,
    pub location_unit_id: Option<i64>,
    #[serde(default, deserialize_with = "double_option")]
    pub room_number: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub entrance_number: Option<Option<String>>,

    pub status: Option<RequestStatus>,
    #[serde(default, deserialize_with = "double_option")]
    pub rejection_comment: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub assigned_master_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub assigned_master_company: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub assigned_master_phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub assigned_company_phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub work_date: Option<Option<DateTime<Utc>>>,

    /// Only settable through the confirm operation.
    pub user_confirmed: Option<bool>,
}

fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn normalize_nullable(value: &mut Option<Option<String>>) {
    if let Some(inner) = value.take() {
        *value = Some(blank_to_none(inner));
    }
}

fn normalize_nullable_phone(value: &mut Option<Option<String>>) -> Result<(), DomainError> {
    normalize_nullable(value);
    if let Some(Some(phone)) = value.as_mut() {
        *phone = shared::validation::normalize_phone(phone).map_err(|e| {
            DomainError::validation(
                e.message
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Invalid phone number".to_string()),
            )
        })?;
    }
    Ok(())
}

impl RequestPatch {
    /// Parses a raw JSON body.
    ///
    /// Fields outside the patch surface (`code`, `owner_id`, `completed_at`,
    /// ...) are refused by name rather than as a parse failure.
    pub fn from_json(body: serde_json::Value) -> Result<Self, DomainError> {
        Self::field_names(&body)?;

        serde_json::from_value(body)
            .map_err(|e| DomainError::validation(format!("Invalid request body: {}", e)))
    }

    /// Keys of a raw JSON body, checked against the patch surface.
    pub fn field_names(body: &serde_json::Value) -> Result<Vec<&str>, DomainError> {
        let object = body
            .as_object()
            .ok_or_else(|| DomainError::validation("Request body must be a JSON object"))?;

        if let Some(field) = object.keys().find(|k| !Self::is_known_field(k)) {
            return Err(DomainError::permission_denied(format!(
                "Field '{}' cannot be modified",
                field
            )));
        }

        Ok(object.keys().map(String::as_str).collect())
    }

    fn is_known_field(field: &str) -> bool {
        OWNER_FIELDS.contains(&field)
            || MASTER_FIELDS.contains(&field)
            || matches!(field, "status" | "rejection_comment" | "user_confirmed")
    }

    /// Names of every field present in the payload, in declaration order.
    pub fn touched_fields(&self) -> Vec<&'static str> {
        let presence = [
            ("name", self.name.is_some()),
            ("type_request", self.type_request.is_some()),
            ("description", self.description.is_some()),
            ("location_unit_id", self.location_unit_id.is_some()),
            ("room_number", self.room_number.is_some()),
            ("entrance_number", self.entrance_number.is_some()),
            ("status", self.status.is_some()),
            ("rejection_comment", self.rejection_comment.is_some()),
            ("assigned_master_name", self.assigned_master_name.is_some()),
            ("assigned_master_company", self.assigned_master_company.is_some()),
            ("assigned_master_phone", self.assigned_master_phone.is_some()),
            ("assigned_company_phone", self.assigned_company_phone.is_some()),
            ("work_date", self.work_date.is_some()),
            ("user_confirmed", self.user_confirmed.is_some()),
        ];

        presence
            .into_iter()
            .filter_map(|(field, present)| present.then_some(field))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.touched_fields().is_empty()
    }

    pub fn touches_master_fields(&self) -> bool {
        self.touched_fields()
            .iter()
            .any(|field| MASTER_FIELDS.contains(field))
    }

    /// Trims text, clears blank optionals, normalizes phone numbers and
    /// checks lengths.
    pub fn normalize(&mut self) -> Result<(), DomainError> {
        if let Some(name) = self.name.as_mut() {
            *name = name.trim().to_string();
            if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
                return Err(DomainError::validation("Name must be 1-255 characters"));
            }
        }
        if let Some(description) = self.description.as_mut() {
            *description = description.trim().to_string();
        }

        normalize_nullable(&mut self.room_number);
        normalize_nullable(&mut self.entrance_number);
        normalize_nullable(&mut self.rejection_comment);
        normalize_nullable(&mut self.assigned_master_name);
        normalize_nullable(&mut self.assigned_master_company);
        normalize_nullable_phone(&mut self.assigned_master_phone)?;
        normalize_nullable_phone(&mut self.assigned_company_phone)?;

        Ok(())
    }
}

/// Query parameters for `GET /requests/list`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListRequestsQuery {
    /// Substring of the request name or code.
    pub q: Option<String>,
    pub status: Option<RequestStatus>,
    #[serde(rename = "type")]
    pub type_request: Option<RequestType>,
}

/// Detail view of a request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct RepairRequestResponse {
    pub id: Uuid,
    pub code: String,
    pub owner_id: Uuid,
    pub name: String,
    pub type_request: RequestType,
    pub description: String,
    pub location_unit_id: i64,
    pub room_number: Option<String>,
    pub entrance_number: Option<String>,
    pub status: RequestStatus,
    pub rejection_comment: Option<String>,
    pub user_confirmed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_master: Option<AssignedMaster>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RepairRequestResponse {
    /// Builds the view a user with `role` is allowed to see.
    pub fn for_viewer(request: RepairRequest, role: Role) -> Self {
        let assigned_master = request
            .master_visible_to(role)
            .then(|| AssignedMaster::from(&request));

        Self {
            id: request.id,
            code: request.code,
            owner_id: request.owner_id,
            name: request.name,
            type_request: request.type_request,
            description: request.description,
            location_unit_id: request.location_unit_id,
            room_number: request.room_number,
            entrance_number: request.entrance_number,
            status: request.status,
            rejection_comment: request.rejection_comment,
            user_confirmed: request.user_confirmed,
            completed_at: request.completed_at,
            assigned_master,
            created_at: request.created_at,
            updated_at: request.updated_at,
        }
    }
}

/// Row of the request list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct RequestListItem {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub type_request: RequestType,
    pub status: RequestStatus,
    pub location_unit_id: i64,
    pub room_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<RepairRequest> for RequestListItem {
    fn from(request: RepairRequest) -> Self {
        Self {
            id: request.id,
            code: request.code,
            name: request.name,
            type_request: request.type_request,
            status: request.status,
            location_unit_id: request.location_unit_id,
            room_number: request.room_number,
            created_at: request.created_at,
            updated_at: request.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListRequestsResponse {
    pub data: Vec<RequestListItem>,
    pub total: usize,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn request(status: RequestStatus, owner_id: Uuid) -> RepairRequest {
        let now = Utc::now();
        RepairRequest {
            id: Uuid::new_v4(),
            code: "0427".to_string(),
            owner_id,
            name: "Leaking radiator".to_string(),
            type_request: RequestType::Heating,
            description: "Water under the radiator in room 214".to_string(),
            location_unit_id: 1,
            room_number: Some("214".to_string()),
            entrance_number: None,
            status,
            rejection_comment: None,
            assigned_master_name: None,
            assigned_master_company: None,
            assigned_master_phone: None,
            assigned_company_phone: None,
            work_date: None,
            user_confirmed: false,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}
