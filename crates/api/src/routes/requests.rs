//! Repair request routes.
//!
//! Every state-changing handler runs one transaction: lock the row, ask the
//! transition policy, write the result and its audit rows, commit. Notifications
//! go out only after the commit.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use domain::models::{
    CreateRepairRequest, ListRequestsQuery, ListRequestsResponse, LocationUnit, RepairRequest,
    RepairRequestResponse, RequestAuditEntry, RequestHistoryResponse, RequestListItem,
    RequestPatch,
};
use domain::services::{
    authorize_confirm, authorize_submit, diff_requests, policy_for, TransitionContext,
};
use persistence::repositories::{
    AuditLogRepository, LocationUnitRepository, NewRepairRequest, RepairRequestRepository,
    RequestImageRepository, RequestListFilter,
};
use sqlx::PgConnection;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentUser;
use crate::middleware::metrics::record_request_created;

fn not_found() -> ApiError {
    ApiError::NotFound("Request not found".to_string())
}

/// Loads a request the caller may read.
pub(crate) async fn load_visible(
    state: &AppState,
    user: &CurrentUser,
    id: Uuid,
) -> Result<RepairRequest, ApiError> {
    let request: RepairRequest = RepairRequestRepository::new(state.pool.clone())
        .find_by_id(id)
        .await?
        .ok_or_else(not_found)?
        .into();

    if !request.is_visible_to(user.user_id, user.role) {
        return Err(ApiError::Forbidden(
            "You do not have access to this request".to_string(),
        ));
    }
    Ok(request)
}

/// Loads and row-locks a request inside the caller's transaction.
pub(crate) async fn lock_request(
    conn: &mut PgConnection,
    id: Uuid,
) -> Result<RepairRequest, ApiError> {
    RepairRequestRepository::lock(conn, id)
        .await?
        .map(RepairRequest::from)
        .ok_or_else(not_found)
}

/// Writes `after` and one audit row per changed field.
async fn save_changes(
    conn: &mut PgConnection,
    before: &RepairRequest,
    after: &RepairRequest,
    actor_id: Uuid,
) -> Result<RepairRequest, ApiError> {
    let saved: RepairRequest = RepairRequestRepository::update(&mut *conn, after)
        .await?
        .into();
    let changes = diff_requests(before, &saved);
    AuditLogRepository::record_changes(&mut *conn, saved.id, Some(actor_id), &changes).await?;
    Ok(saved)
}

async fn check_location(
    state: &AppState,
    location_unit_id: i64,
    entrance_number: Option<&str>,
) -> Result<(), ApiError> {
    let unit: LocationUnit = LocationUnitRepository::new(state.pool.clone())
        .find_by_id(location_unit_id)
        .await?
        .ok_or_else(|| ApiError::Validation("Unknown location unit".to_string()))?
        .into();
    unit.check_entrance(entrance_number)?;
    Ok(())
}

/// Create a request in `empty`.
///
/// POST /api/v1/requests
pub async fn create_request(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<CreateRepairRequest>,
) -> Result<(StatusCode, Json<RepairRequestResponse>), ApiError> {
    if user.is_manager() {
        return Err(ApiError::Forbidden(
            "Only students and lecturers can create requests".to_string(),
        ));
    }

    let body = body.normalized();
    body.validate()?;
    check_location(&state, body.location_unit_id, body.entrance_number.as_deref()).await?;

    let repo = RepairRequestRepository::new(state.pool.clone());
    let new = NewRepairRequest {
        owner_id: user.user_id,
        name: &body.name,
        type_request: body.type_request.into(),
        description: &body.description,
        location_unit_id: body.location_unit_id,
        room_number: body.room_number.as_deref(),
        entrance_number: body.entrance_number.as_deref(),
    };

    if repo.has_in_flight_duplicate(&new).await? {
        return Err(ApiError::Validation(
            "You already have an active request with the same details".to_string(),
        ));
    }

    let request: RepairRequest = repo
        .create(&new, state.config.requests.code_generation_attempts)
        .await?
        .into();

    record_request_created();
    tracing::info!(
        request_id = %request.id,
        user_id = %user.user_id,
        code = %request.code,
        "Repair request created"
    );

    Ok((
        StatusCode::CREATED,
        Json(RepairRequestResponse::for_viewer(request, user.role)),
    ))
}

/// GET /api/v1/requests/:id
pub async fn get_request(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<RepairRequestResponse>, ApiError> {
    let request = load_visible(&state, &user, id).await?;
    Ok(Json(RepairRequestResponse::for_viewer(request, user.role)))
}

/// Role-scoped listing.
///
/// Students and lecturers see their own requests in every status; managers
/// see everything that has been submitted.
///
/// GET /api/v1/requests/list
pub async fn list_requests(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ListRequestsQuery>,
) -> Result<Json<ListRequestsResponse>, ApiError> {
    let filter = RequestListFilter {
        owner_id: (!user.is_manager()).then_some(user.user_id),
        hide_unsubmitted: user.is_manager(),
        status: query.status.map(Into::into),
        type_request: query.type_request.map(Into::into),
        query: query.q,
    };

    let data: Vec<RequestListItem> = RepairRequestRepository::new(state.pool.clone())
        .list(&filter)
        .await?
        .into_iter()
        .map(|entity| RequestListItem::from(RepairRequest::from(entity)))
        .collect();

    Ok(Json(ListRequestsResponse {
        total: data.len(),
        data,
    }))
}

/// Role-gated field update.
///
/// PATCH /api/v1/requests/:id
pub async fn update_request(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<RepairRequestResponse>, ApiError> {
    let policy = policy_for(user.role);
    policy.check_fields(&RequestPatch::field_names(&body)?)?;

    let mut patch = RequestPatch::from_json(body)?;
    patch.normalize()?;

    let ctx = TransitionContext::new(Utc::now(), state.config.requests.done_grace_period());

    let mut tx = state.pool.begin().await?;
    let current = lock_request(&mut tx, id).await?;

    let decision = policy.authorize(user.user_id, &current, &patch, &ctx)?;
    let next = current.apply(&patch, &decision);

    if patch.location_unit_id.is_some() || patch.entrance_number.is_some() {
        check_location(&state, next.location_unit_id, next.entrance_number.as_deref()).await?;
    }

    let saved = save_changes(&mut tx, &current, &next, user.user_id).await?;
    tx.commit().await?;

    tracing::info!(
        request_id = %saved.id,
        user_id = %user.user_id,
        from = %current.status,
        status = %saved.status,
        "Repair request updated"
    );

    state.notifier.dispatch(saved.clone(), decision.events);
    Ok(Json(RepairRequestResponse::for_viewer(saved, user.role)))
}

/// `empty -> pending`.
///
/// POST /api/v1/requests/:id/submit
pub async fn submit_request(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<RepairRequestResponse>, ApiError> {
    let mut tx = state.pool.begin().await?;
    let current = lock_request(&mut tx, id).await?;
    let image_count = RequestImageRepository::count_for_request(&mut tx, id).await?;

    let decision = authorize_submit(user.user_id, &current, image_count)?;
    let next = current.apply(&RequestPatch::default(), &decision);

    let saved = save_changes(&mut tx, &current, &next, user.user_id).await?;
    tx.commit().await?;

    tracing::info!(request_id = %saved.id, user_id = %user.user_id, "Repair request submitted");

    state.notifier.dispatch(saved.clone(), decision.events);
    Ok(Json(RepairRequestResponse::for_viewer(saved, user.role)))
}

/// Owner confirmation of completed work. Confirming twice is a no-op.
///
/// POST /api/v1/requests/:id/confirm
pub async fn confirm_request(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<RepairRequestResponse>, ApiError> {
    let mut tx = state.pool.begin().await?;
    let current = lock_request(&mut tx, id).await?;

    let Some(event) = authorize_confirm(user.user_id, &current, Utc::now())? else {
        tx.rollback().await?;
        return Ok(Json(RepairRequestResponse::for_viewer(current, user.role)));
    };

    let next = RepairRequest {
        user_confirmed: true,
        ..current.clone()
    };
    let saved = save_changes(&mut tx, &current, &next, user.user_id).await?;
    tx.commit().await?;

    tracing::info!(request_id = %saved.id, user_id = %user.user_id, "Completion confirmed");

    state.notifier.dispatch(saved.clone(), vec![event]);
    Ok(Json(RepairRequestResponse::for_viewer(saved, user.role)))
}

/// Field-level change history, oldest first.
///
/// GET /api/v1/requests/:id/history
pub async fn request_history(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<RequestHistoryResponse>, ApiError> {
    let request = load_visible(&state, &user, id).await?;

    let entries = AuditLogRepository::new(state.pool.clone())
        .list_for_request(request.id)
        .await?
        .into_iter()
        .map(RequestAuditEntry::from)
        .collect();

    Ok(Json(RequestHistoryResponse {
        request_id: request.id,
        entries,
    }))
}
