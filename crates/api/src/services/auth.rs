//! Authentication service for registration codes, registration, and login sessions.

use chrono::{Duration, Utc};
use domain::models::{LoginResponse, RegisterRequest, RegistrationCode, User, UserSummary};
use persistence::repositories::{
    NewUser, RegistrationCodeRepository, SessionRepository, UserRepository,
};
use shared::jwt::{JwtConfig, JwtError};
use shared::password::{hash_optional_password, PasswordError};
use shared::validation::normalize_phone;
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::config::JwtAuthConfig;
use crate::error::ApiError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Registration code not found")]
    UnknownCode,

    #[error("Email already registered")]
    EmailAlreadyExists,

    #[error("Invalid phone number: {0}")]
    InvalidPhone(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User is disabled")]
    UserDisabled,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Token error: {0}")]
    TokenError(#[from] JwtError),

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::UnknownCode => ApiError::NotFound("Registration code not found".to_string()),
            AuthError::EmailAlreadyExists => {
                ApiError::Conflict("Email already registered".to_string())
            }
            AuthError::InvalidPhone(msg) => ApiError::Validation(msg),
            AuthError::InvalidCredentials => {
                ApiError::Unauthorized("Invalid email or code".to_string())
            }
            AuthError::UserDisabled => ApiError::Unauthorized("User is disabled".to_string()),
            AuthError::InvalidToken => {
                ApiError::Unauthorized("Invalid or expired token".to_string())
            }
            AuthError::DatabaseError(db_err) => ApiError::from(db_err),
            AuthError::PasswordError(e) => ApiError::Internal(format!("Password error: {}", e)),
            AuthError::TokenError(e) => ApiError::Internal(format!("Token error: {}", e)),
        }
    }
}

/// Builds the token signer from configuration.
///
/// PEM keys supplied through environment variables often carry literal `\n`
/// sequences, which are turned back into newlines here.
pub fn build_jwt_config(config: &JwtAuthConfig) -> Result<JwtConfig, JwtError> {
    JwtConfig::new(
        &normalize_pem_key(&config.private_key),
        &normalize_pem_key(&config.public_key),
        config.access_token_expiry_secs,
        config.leeway_secs,
    )
}

fn normalize_pem_key(key: &str) -> String {
    key.trim_matches('"')
        .trim_matches('\'')
        .replace("\\n", "\n")
}

/// Authentication service.
pub struct AuthService {
    users: UserRepository,
    codes: RegistrationCodeRepository,
    sessions: SessionRepository,
    jwt: Arc<JwtConfig>,
}

impl AuthService {
    pub fn new(pool: PgPool, jwt: Arc<JwtConfig>) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            codes: RegistrationCodeRepository::new(pool.clone()),
            sessions: SessionRepository::new(pool),
            jwt,
        }
    }

    /// Looks up a registration code. Codes are never consumed.
    pub async fn verify_code(&self, code: &str) -> Result<RegistrationCode, AuthError> {
        self.codes
            .find_by_code(code.trim())
            .await?
            .map(RegistrationCode::from)
            .ok_or(AuthError::UnknownCode)
    }

    /// Registers a user whose role and names come from the registration code.
    pub async fn register(&self, request: &RegisterRequest) -> Result<User, AuthError> {
        let code = self.verify_code(&request.code).await?;

        let phone = normalize_phone(&request.phone).map_err(|e| {
            AuthError::InvalidPhone(
                e.message
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Invalid phone number".to_string()),
            )
        })?;

        let email = request.email.trim().to_lowercase();
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailAlreadyExists);
        }

        let password_hash = hash_optional_password(request.password.as_deref())?;

        let created = self
            .users
            .create(NewUser {
                email: &email,
                phone: &phone,
                password_hash: &password_hash,
                first_name: &code.first_name,
                last_name: &code.last_name,
                patronymic: code.patronymic.as_deref(),
                role: code.role.into(),
            })
            .await;

        // Concurrent registration with the same email
        match created {
            Err(e) if persistence::is_unique_violation(&e, None) => {
                Err(AuthError::EmailAlreadyExists)
            }
            other => Ok(other?.into()),
        }
    }

    /// Logs in with email and a registration code belonging to the user's role.
    pub async fn login(&self, email: &str, code: &str) -> Result<LoginResponse, AuthError> {
        let user: User = self
            .users
            .find_by_email(&email.trim().to_lowercase())
            .await?
            .ok_or(AuthError::InvalidCredentials)?
            .into();

        if !user.is_active {
            return Err(AuthError::UserDisabled);
        }

        if !self
            .codes
            .exists_for_role(code.trim(), user.role.into())
            .await?
        {
            return Err(AuthError::InvalidCredentials);
        }

        let issued = self.jwt.issue(user.id, user.role.as_str())?;
        let expires_at = Utc::now() + Duration::seconds(issued.expires_in);
        self.sessions
            .create(user.id, &issued.jti, expires_at)
            .await?;

        tracing::info!(user_id = %user.id, role = %user.role, "User logged in");

        Ok(LoginResponse {
            access_token: issued.token,
            token_type: "Bearer".to_string(),
            expires_in: issued.expires_in,
            user: UserSummary::from(user),
        })
    }

    /// Revokes the session behind a token.
    pub async fn logout(&self, user_id: Uuid, jti: &str) -> Result<(), AuthError> {
        if self.sessions.delete_by_jti(jti).await? {
            tracing::info!(user_id = %user_id, "User logged out");
            Ok(())
        } else {
            Err(AuthError::InvalidToken)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[test]
    fn test_normalize_pem_key() {
        let raw = "\"-----BEGIN PUBLIC KEY-----\\nabc\\n-----END PUBLIC KEY-----\"";
        assert_eq!(
            normalize_pem_key(raw),
            "-----BEGIN PUBLIC KEY-----\nabc\n-----END PUBLIC KEY-----"
        );
    }

    #[test]
    fn test_build_jwt_config_rejects_invalid_keys() {
        let config = JwtAuthConfig {
            private_key: "not a key".to_string(),
            public_key: "not a key".to_string(),
            access_token_expiry_secs: 3600,
            leeway_secs: 30,
        };
        assert!(matches!(
            build_jwt_config(&config),
            Err(JwtError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_auth_error_status_codes() {
        let cases = [
            (AuthError::UnknownCode, StatusCode::NOT_FOUND),
            (AuthError::EmailAlreadyExists, StatusCode::CONFLICT),
            (AuthError::InvalidPhone("bad".into()), StatusCode::BAD_REQUEST),
            (AuthError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (AuthError::UserDisabled, StatusCode::UNAUTHORIZED),
            (AuthError::InvalidToken, StatusCode::UNAUTHORIZED),
        ];

        for (error, status) in cases {
            assert_eq!(ApiError::from(error).into_response().status(), status);
        }
    }
}
