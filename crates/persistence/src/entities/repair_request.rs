//! Repair request entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{RepairRequest, RequestStatus, RequestType};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for request_status that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "request_status", rename_all = "snake_case")]
pub enum RequestStatusDb {
    Empty,
    Pending,
    Approved,
    Rejected,
    OnCheck,
    Done,
}

impl From<RequestStatusDb> for RequestStatus {
    fn from(db: RequestStatusDb) -> Self {
        match db {
            RequestStatusDb::Empty => RequestStatus::Empty,
            RequestStatusDb::Pending => RequestStatus::Pending,
            RequestStatusDb::Approved => RequestStatus::Approved,
            RequestStatusDb::Rejected => RequestStatus::Rejected,
            RequestStatusDb::OnCheck => RequestStatus::OnCheck,
            RequestStatusDb::Done => RequestStatus::Done,
        }
    }
}

impl From<RequestStatus> for RequestStatusDb {
    fn from(status: RequestStatus) -> Self {
        match status {
            RequestStatus::Empty => RequestStatusDb::Empty,
            RequestStatus::Pending => RequestStatusDb::Pending,
            RequestStatus::Approved => RequestStatusDb::Approved,
            RequestStatus::Rejected => RequestStatusDb::Rejected,
            RequestStatus::OnCheck => RequestStatusDb::OnCheck,
            RequestStatus::Done => RequestStatusDb::Done,
        }
    }
}

/// Database enum for request_type that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "request_type", rename_all = "snake_case")]
pub enum RequestTypeDb {
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

impl From<RequestTypeDb> for RequestType {
    fn from(db: RequestTypeDb) -> Self {
        match db {
            RequestTypeDb::ElectricalAppliances => RequestType::ElectricalAppliances,
            RequestTypeDb::Electricity => RequestType::Electricity,
            RequestTypeDb::Plumbing => RequestType::Plumbing,
            RequestTypeDb::Heating => RequestType::Heating,
            RequestTypeDb::Ventilation => RequestType::Ventilation,
            RequestTypeDb::Internet => RequestType::Internet,
            RequestTypeDb::Furniture => RequestType::Furniture,
            RequestTypeDb::WindowsDoors => RequestType::WindowsDoors,
            RequestTypeDb::Other => RequestType::Other,
        }
    }
}

impl From<RequestType> for RequestTypeDb {
    fn from(t: RequestType) -> Self {
        match t {
            RequestType::ElectricalAppliances => RequestTypeDb::ElectricalAppliances,
            RequestType::Electricity => RequestTypeDb::Electricity,
            RequestType::Plumbing => RequestTypeDb::Plumbing,
            RequestType::Heating => RequestTypeDb::Heating,
            RequestType::Ventilation => RequestTypeDb::Ventilation,
            RequestType::Internet => RequestTypeDb::Internet,
            RequestType::Furniture => RequestTypeDb::Furniture,
            RequestType::WindowsDoors => RequestTypeDb::WindowsDoors,
            RequestType::Other => RequestTypeDb::Other,
        }
    }
}

/// Database row mapping for the repair_requests table.
#[derive(Debug, Clone, FromRow)]
pub struct RepairRequestEntity {
    pub id: Uuid,
    pub code: String,
    pub owner_id: Uuid,
    pub name: String,
    pub type_request: RequestTypeDb,
    pub description: String,
    pub location_unit_id: i64,
    pub room_number: Option<String>,
    pub entrance_number: Option<String>,
    pub status: RequestStatusDb,
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

impl From<RepairRequestEntity> for RepairRequest {
    fn from(entity: RepairRequestEntity) -> Self {
        Self {
            id: entity.id,
            code: entity.code,
            owner_id: entity.owner_id,
            name: entity.name,
            type_request: entity.type_request.into(),
            description: entity.description,
            location_unit_id: entity.location_unit_id,
            room_number: entity.room_number,
            entrance_number: entity.entrance_number,
            status: entity.status.into(),
            rejection_comment: entity.rejection_comment,
            assigned_master_name: entity.assigned_master_name,
            assigned_master_company: entity.assigned_master_company,
            assigned_master_phone: entity.assigned_master_phone,
            assigned_company_phone: entity.assigned_company_phone,
            work_date: entity.work_date,
            user_confirmed: entity.user_confirmed,
            completed_at: entity.completed_at,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping_round_trips() {
        for status in RequestStatus::ALL {
            let db: RequestStatusDb = status.into();
            assert_eq!(RequestStatus::from(db), status);
        }
    }

    #[test]
    fn test_type_mapping_round_trips() {
        let all = [
            RequestType::ElectricalAppliances,
            RequestType::Electricity,
            RequestType::Plumbing,
            RequestType::Heating,
            RequestType::Ventilation,
            RequestType::Internet,
            RequestType::Furniture,
            RequestType::WindowsDoors,
            RequestType::Other,
        ];
        for t in all {
            let db: RequestTypeDb = t.into();
            assert_eq!(RequestType::from(db), t);
        }
    }
}
