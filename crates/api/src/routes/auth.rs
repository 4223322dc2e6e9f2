//! Authentication routes: registration codes, registration, login, logout.

use axum::{extract::State, http::StatusCode, Json};
use domain::models::{
    LoginRequest, LoginResponse, RegisterRequest, UserSummary, VerifyCodeRequest,
    VerifyCodeResponse,
};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentUser;
use crate::services::auth::AuthService;

fn auth_service(state: &AppState) -> AuthService {
    AuthService::new(state.pool.clone(), state.jwt.clone())
}

/// Look up a registration code without creating a user.
///
/// POST /api/v1/auth/verify-code
pub async fn verify_code(
    State(state): State<AppState>,
    Json(request): Json<VerifyCodeRequest>,
) -> Result<Json<VerifyCodeResponse>, ApiError> {
    request.validate()?;

    let code = auth_service(&state).verify_code(&request.code).await?;
    Ok(Json(code.into()))
}

/// Register a user with a registration code.
///
/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserSummary>), ApiError> {
    request.validate()?;

    let user = auth_service(&state).register(&request).await?;
    tracing::info!(user_id = %user.id, role = %user.role, "User registered");

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Log in with e-mail and registration code.
///
/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    request
        .validate()
        .map_err(|_| ApiError::Unauthorized("Invalid email or code".to_string()))?;

    let response = auth_service(&state)
        .login(&request.email, &request.code)
        .await?;
    Ok(Json(response))
}

/// Revoke the session behind the presented token.
///
/// POST /api/v1/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<StatusCode, ApiError> {
    auth_service(&state).logout(user.user_id, &user.jti).await?;
    Ok(StatusCode::NO_CONTENT)
}
