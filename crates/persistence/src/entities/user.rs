//! User, registration code and session entities (database row mappings).

use chrono::{DateTime, Utc};
use domain::models::{RegistrationCode, Role, User};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for user_role that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum UserRoleDb {
    Student,
    Lecturer,
    Manager,
}

impl From<UserRoleDb> for Role {
    fn from(db_role: UserRoleDb) -> Self {
        match db_role {
            UserRoleDb::Student => Role::Student,
            UserRoleDb::Lecturer => Role::Lecturer,
            UserRoleDb::Manager => Role::Manager,
        }
    }
}

impl From<Role> for UserRoleDb {
    fn from(role: Role) -> Self {
        match role {
            Role::Student => UserRoleDb::Student,
            Role::Lecturer => UserRoleDb::Lecturer,
            Role::Manager => UserRoleDb::Manager,
        }
    }
}

/// Database row mapping for the users table.
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: Uuid,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub patronymic: Option<String>,
    pub role: UserRoleDb,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserEntity> for User {
    fn from(entity: UserEntity) -> Self {
        Self {
            id: entity.id,
            email: entity.email,
            phone: entity.phone,
            first_name: entity.first_name,
            last_name: entity.last_name,
            patronymic: entity.patronymic,
            role: entity.role.into(),
            is_active: entity.is_active,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Database row mapping for the registration_codes table.
#[derive(Debug, Clone, FromRow)]
pub struct RegistrationCodeEntity {
    pub id: i64,
    pub code: String,
    pub role: UserRoleDb,
    pub first_name: String,
    pub last_name: String,
    pub patronymic: Option<String>,
    pub faculty: Option<String>,
    pub group_name: Option<String>,
    pub position: Option<String>,
}

impl From<RegistrationCodeEntity> for RegistrationCode {
    fn from(entity: RegistrationCodeEntity) -> Self {
        Self {
            id: entity.id,
            code: entity.code,
            role: entity.role.into(),
            first_name: entity.first_name,
            last_name: entity.last_name,
            patronymic: entity.patronymic,
            faculty: entity.faculty,
            group_name: entity.group_name,
            position: entity.position,
        }
    }
}

/// Database row mapping for the user_sessions table.
#[derive(Debug, Clone, FromRow)]
pub struct UserSessionEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub jti: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
