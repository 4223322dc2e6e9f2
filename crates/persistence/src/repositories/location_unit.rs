//! Location unit repository.

use sqlx::PgPool;

use crate::entities::LocationUnitEntity;
use crate::metrics::QueryTimer;

#[derive(Clone)]
pub struct LocationUnitRepository {
    pool: PgPool,
}

impl LocationUnitRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<LocationUnitEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_location_units");
        let result = sqlx::query_as::<_, LocationUnitEntity>(
            "SELECT id, name, type, address FROM location_units ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<LocationUnitEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_location_unit_by_id");
        let result = sqlx::query_as::<_, LocationUnitEntity>(
            "SELECT id, name, type, address FROM location_units WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }
}
