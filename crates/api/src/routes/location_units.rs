//! Location unit listing.

use axum::{extract::State, Json};
use domain::models::LocationUnit;
use persistence::repositories::LocationUnitRepository;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentUser;

/// GET /api/v1/location-units
pub async fn list_location_units(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Result<Json<Vec<LocationUnit>>, ApiError> {
    let units = LocationUnitRepository::new(state.pool.clone())
        .list()
        .await?
        .into_iter()
        .map(LocationUnit::from)
        .collect();
    Ok(Json(units))
}
