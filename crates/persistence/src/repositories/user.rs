//! User, registration code and session repositories.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{RegistrationCodeEntity, UserEntity, UserRoleDb, UserSessionEntity};
use crate::metrics::QueryTimer;

const USER_COLUMNS: &str = "id, email, phone, password_hash, first_name, last_name, patronymic, \
                            role, is_active, created_at, updated_at";

/// Input for creating a user.
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub phone: &'a str,
    pub password_hash: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub patronymic: Option<&'a str>,
    pub role: UserRoleDb,
}

/// Repository for user-related database operations.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a user. Fails with a unique violation on duplicate email.
    pub async fn create(&self, user: NewUser<'_>) -> Result<UserEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_user");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            r#"
            INSERT INTO users (email, phone, password_hash, first_name, last_name, patronymic, role)
            VALUES (LOWER($1), $2, $3, $4, $5, $6, $7)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.email)
        .bind(user.phone)
        .bind(user.password_hash)
        .bind(user.first_name)
        .bind(user.last_name)
        .bind(user.patronymic)
        .bind(user.role)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_id");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Case-insensitive lookup by email.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_email");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = LOWER($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// E-mail addresses of every active manager.
    pub async fn manager_emails(&self) -> Result<Vec<String>, sqlx::Error> {
        let timer = QueryTimer::new("list_manager_emails");
        let result = sqlx::query_scalar::<_, String>(
            r#"
            SELECT email FROM users
            WHERE role = 'manager' AND is_active
            ORDER BY email
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}

/// Repository for operator-seeded registration codes.
#[derive(Clone)]
pub struct RegistrationCodeRepository {
    pool: PgPool,
}

impl RegistrationCodeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_code(
        &self,
        code: &str,
    ) -> Result<Option<RegistrationCodeEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_registration_code");
        let result = sqlx::query_as::<_, RegistrationCodeEntity>(
            r#"
            SELECT id, code, role, first_name, last_name, patronymic, faculty, group_name, position
            FROM registration_codes
            WHERE code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Whether `code` exists among the codes of `role`.
    pub async fn exists_for_role(&self, code: &str, role: UserRoleDb) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("registration_code_exists_for_role");
        let result = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM registration_codes WHERE code = $1 AND role = $2)",
        )
        .bind(code)
        .bind(role)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }
}

/// Repository for login sessions backing issued tokens.
#[derive(Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        jti: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<UserSessionEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_user_session");
        let result = sqlx::query_as::<_, UserSessionEntity>(
            r#"
            INSERT INTO user_sessions (user_id, jti, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, jti, expires_at, created_at
            "#,
        )
        .bind(user_id)
        .bind(jti)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Whether an unexpired session exists for the token identifier.
    pub async fn is_active(&self, jti: &str) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("user_session_is_active");
        let result = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM user_sessions WHERE jti = $1 AND expires_at > NOW())",
        )
        .bind(jti)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Deletes the session for a token. Returns whether one existed.
    pub async fn delete_by_jti(&self, jti: &str) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_user_session");
        let result = sqlx::query("DELETE FROM user_sessions WHERE jti = $1")
            .bind(jti)
            .execute(&self.pool)
            .await;
        timer.record();
        result.map(|r| r.rows_affected() > 0)
    }

    /// Removes expired sessions, returning the number deleted.
    pub async fn delete_expired(&self) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_expired_user_sessions");
        let result = sqlx::query("DELETE FROM user_sessions WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await;
        timer.record();
        result.map(|r| r.rows_affected())
    }
}
