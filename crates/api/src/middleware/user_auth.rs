//! Bearer-token authentication.
//!
//! A token is accepted only when its signature checks out, its session row
//! still exists, and the user it names is active. The role is taken from the
//! stored user, not from the token.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use domain::models::{Role, User};
use persistence::repositories::{SessionRepository, UserRepository};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;

/// Authenticated caller, stored in request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub role: Role,
    pub email: String,
    /// Token ID backing the session.
    pub jti: String,
}

impl AuthenticatedUser {
    pub fn is_manager(&self) -> bool {
        self.role.is_manager()
    }
}

/// Extracts the token from an `Authorization: Bearer ...` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Missing or invalid Authorization header".into()))
}

/// Resolves the caller from request headers.
pub async fn authenticate(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<AuthenticatedUser, ApiError> {
    let token = bearer_token(headers)?;

    let claims = state.jwt.validate(token).map_err(|e| {
        tracing::debug!("JWT validation failed: {}", e);
        ApiError::Unauthorized("Invalid or expired token".into())
    })?;
    let user_id = shared::jwt::extract_user_id(&claims)
        .map_err(|_| ApiError::Unauthorized("Invalid or expired token".into()))?;

    if !SessionRepository::new(state.pool.clone())
        .is_active(&claims.jti)
        .await?
    {
        return Err(ApiError::Unauthorized("Session has ended".into()));
    }

    let user: User = UserRepository::new(state.pool.clone())
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User no longer exists".into()))?
        .into();

    if !user.is_active {
        return Err(ApiError::Unauthorized("User is disabled".into()));
    }

    Ok(AuthenticatedUser {
        user_id: user.id,
        role: user.role,
        email: user.email,
        jti: claims.jti,
    })
}

/// Rejects requests without a valid session and stores the caller in
/// request extensions for handlers and the rate limiter.
pub async fn require_user_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    match authenticate(&state, req.headers()).await {
        Ok(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(e) => e.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_extracted() {
        let headers = headers_with("Bearer abc.def.ghi");
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_bearer_token_missing_or_malformed() {
        assert!(bearer_token(&HeaderMap::new()).is_err());
        assert!(bearer_token(&headers_with("Basic dXNlcjpwYXNz")).is_err());
        assert!(bearer_token(&headers_with("Bearer ")).is_err());
    }

    #[test]
    fn test_is_manager() {
        let user = AuthenticatedUser {
            user_id: Uuid::new_v4(),
            role: Role::Manager,
            email: "manager@univ.edu.ua".to_string(),
            jti: "jti".to_string(),
        };
        assert!(user.is_manager());
        assert!(!AuthenticatedUser {
            role: Role::Lecturer,
            ..user
        }
        .is_manager());
    }
}
