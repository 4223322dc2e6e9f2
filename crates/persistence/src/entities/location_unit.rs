//! Location unit entity (database row mapping).

use domain::models::{LocationKind, LocationUnit};
use sqlx::FromRow;

/// Database enum for location_type that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "location_type", rename_all = "lowercase")]
pub enum LocationTypeDb {
    University,
    Dormitory,
}

impl From<LocationTypeDb> for LocationKind {
    fn from(db: LocationTypeDb) -> Self {
        match db {
            LocationTypeDb::University => LocationKind::University,
            LocationTypeDb::Dormitory => LocationKind::Dormitory,
        }
    }
}

/// Database row mapping for the location_units table.
#[derive(Debug, Clone, FromRow)]
pub struct LocationUnitEntity {
    pub id: i64,
    pub name: String,
    #[sqlx(rename = "type")]
    pub kind: LocationTypeDb,
    pub address: Option<String>,
}

impl From<LocationUnitEntity> for LocationUnit {
    fn from(entity: LocationUnitEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            kind: entity.kind.into(),
            address: entity.address,
        }
    }
}
