//! Location unit domain models.

use serde::{Deserialize, Serialize};

use crate::DomainError;

/// Kind of building a request can be filed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationKind {
    University,
    Dormitory,
}

impl std::fmt::Display for LocationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocationKind::University => write!(f, "university"),
            LocationKind::Dormitory => write!(f, "dormitory"),
        }
    }
}

/// A university building or dormitory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationUnit {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: LocationKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl LocationUnit {
    /// Dormitories require an entrance number; university buildings forbid one.
    pub fn check_entrance(&self, entrance: Option<&str>) -> Result<(), DomainError> {
        let entrance = entrance.map(str::trim).filter(|e| !e.is_empty());

        match (self.kind, entrance) {
            (LocationKind::Dormitory, None) => Err(DomainError::validation(
                "Entrance number is required for dormitories",
            )),
            (LocationKind::University, Some(_)) => Err(DomainError::validation(
                "Entrance number must not be set for university buildings",
            )),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(kind: LocationKind) -> LocationUnit {
        LocationUnit {
            id: 1,
            name: "Building".to_string(),
            kind,
            address: None,
        }
    }

    #[test]
    fn test_dormitory_requires_entrance() {
        let dorm = unit(LocationKind::Dormitory);
        assert!(dorm.check_entrance(Some("2")).is_ok());
        assert!(dorm.check_entrance(None).is_err());
        assert!(dorm.check_entrance(Some("  ")).is_err());
    }

    #[test]
    fn test_university_forbids_entrance() {
        let building = unit(LocationKind::University);
        assert!(building.check_entrance(None).is_ok());
        assert!(building.check_entrance(Some("")).is_ok());
        assert!(matches!(
            building.check_entrance(Some("1")),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_serializes_kind_as_type() {
        let json = serde_json::to_value(unit(LocationKind::Dormitory)).unwrap();
        assert_eq!(json["type"], "dormitory");
        assert!(json.get("address").is_none());
    }
}
