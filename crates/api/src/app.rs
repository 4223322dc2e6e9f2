use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use domain::services::NotificationService;
use shared::jwt::{JwtConfig, JwtError};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, rate_limit_middleware, require_user_auth,
    security_headers_middleware, trace_id, RateLimiterState,
};
use crate::routes::{auth, health, images, location_units, requests};
use crate::services::auth::build_jwt_config;
use crate::services::email::EmailService;
use crate::services::notifications::NotificationDispatcher;
use crate::services::storage::{ImageStorage, LocalImageStorage};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub jwt: Arc<JwtConfig>,
    pub rate_limiter: Option<Arc<RateLimiterState>>,
    pub notifier: NotificationDispatcher,
    pub storage: Arc<dyn ImageStorage>,
}

/// Builds the application with the e-mail sender and local image storage
/// described by `config`.
pub fn create_app(config: Config, pool: PgPool) -> Result<Router, JwtError> {
    let notifications: Arc<dyn NotificationService> =
        Arc::new(EmailService::new(config.email.clone()));
    let storage: Arc<dyn ImageStorage> =
        Arc::new(LocalImageStorage::new(config.storage.media_root.clone()));
    create_app_with(config, pool, notifications, storage)
}

/// Builds the application with explicit notification and storage backends.
pub fn create_app_with(
    config: Config,
    pool: PgPool,
    notifications: Arc<dyn NotificationService>,
    storage: Arc<dyn ImageStorage>,
) -> Result<Router, JwtError> {
    let jwt = Arc::new(build_jwt_config(&config.jwt)?);
    let config = Arc::new(config);

    let state = AppState {
        notifier: NotificationDispatcher::new(pool.clone(), notifications),
        pool,
        config: config.clone(),
        jwt,
        rate_limiter: RateLimiterState::new(config.security.rate_limit_per_minute).map(Arc::new),
        storage,
    };

    let cors = if config.security.cors_origins.is_empty() {
        // Development: allow any origin
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Middleware order: auth runs first, then rate limiting (which needs the caller)
    let protected_routes = Router::new()
        .route("/api/v1/auth/logout", post(auth::logout))
        .route("/api/v1/location-units", get(location_units::list_location_units))
        .route("/api/v1/requests", post(requests::create_request))
        .route("/api/v1/requests/list", get(requests::list_requests))
        .route(
            "/api/v1/requests/:id",
            get(requests::get_request).patch(requests::update_request),
        )
        .route("/api/v1/requests/:id/submit", post(requests::submit_request))
        .route("/api/v1/requests/:id/confirm", post(requests::confirm_request))
        .route("/api/v1/requests/:id/history", get(requests::request_history))
        .route(
            "/api/v1/requests/:id/upload-image",
            post(images::upload_images)
                .layer(DefaultBodyLimit::max(config.server.max_upload_body_size)),
        )
        .route("/api/v1/requests/:id/images", get(images::list_images))
        .route(
            "/api/v1/request-images/:id",
            axum::routing::delete(images::delete_image),
        )
        .route("/api/v1/request-images/:id/file", get(images::download_image))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_user_auth,
        ));

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler))
        .route("/api/v1/auth/verify-code", post(auth::verify_code))
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login));

    Ok(Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(DefaultBodyLimit::max(config.server.max_body_size))
        .layer(RequestBodyLimitLayer::new(config.server.max_upload_body_size))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security_headers_middleware,
        ))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state))
}
